//! Edit-dialog controller: binds one tag record to one open dialog's form.
//!
//! The controller never talks to the store or the dialog manager. It turns
//! user events into intents (returned to the caller) and record snapshots
//! (fed in through [`EditDialogController::observe`]) into form state.
//!
//! # Phases
//!
//! ```text
//! Loading ──record idle──▶ Ready ──valid+dirty submit──▶ Submitting
//!                            ▲                              │
//!                            ├────── success (reseed) ◀─────┤
//!                            │                              ▼
//!                            └────── user edit ◀─── ReadyWithServerError
//! ```
//!
//! Fields are disabled in `Loading` and `Submitting`.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::form::{FormSnapshot, FormState};
use crate::model::{
    ConfirmIntent, DialogDescriptor, DialogId, DocumentType, ServerError, Slug, TagFormData,
    TagItem, TagRecord, UpdateIntent,
};
use crate::sanitize::Sanitizer;
use crate::validate::{NAME_FIELD, Schema, TagFormValues};

/// Lifecycle phase of one open edit dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No record yet, or the record is busy with a request this dialog did
    /// not start.
    Loading,
    /// Record loaded and idle; the user may edit.
    Ready,
    /// An update from this dialog is in flight.
    Submitting,
    /// The store reported an error, shown on the name field.
    ReadyWithServerError,
}

impl Phase {
    #[must_use]
    pub const fn fields_disabled(self) -> bool {
        matches!(self, Self::Loading | Self::Submitting)
    }
}

/// Serializable view of the controller's derived state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSnapshot {
    pub phase: Phase,
    pub form: FormSnapshot,
    pub fields_disabled: bool,
    pub can_submit: bool,
    pub can_delete: bool,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

/// Control logic for one tag edit dialog.
#[derive(Debug, Clone)]
pub struct EditDialogController {
    descriptor: DialogDescriptor,
    form: FormState,
    record: Option<TagRecord>,
    last_error: Option<ServerError>,
    phase: Phase,
    seeded: bool,
    in_flight: bool,
}

impl EditDialogController {
    /// Bind `descriptor` to the record snapshot available at mount.
    ///
    /// A missing or busy record yields a controller in [`Phase::Loading`]
    /// with every control disabled. Defaults are seeded from the record name
    /// as soon as a record is seen.
    #[must_use]
    pub fn initialize(descriptor: DialogDescriptor, item: Option<&TagItem>, schema: Schema) -> Self {
        let defaults = item.map_or_else(TagFormValues::default, |item| {
            TagFormValues::new(item.tag.name.current())
        });
        let mut controller = Self {
            descriptor,
            form: FormState::new(schema, defaults),
            record: None,
            last_error: None,
            phase: Phase::Loading,
            seeded: false,
            in_flight: false,
        };
        controller.observe(item);
        debug!(
            dialog = %controller.descriptor.id,
            tag = %controller.descriptor.tag_id,
            phase = ?controller.phase,
            "edit dialog initialized"
        );
        controller
    }

    #[must_use]
    pub const fn descriptor(&self) -> &DialogDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn form(&self) -> &FormState {
        &self.form
    }

    #[must_use]
    pub const fn record(&self) -> Option<&TagRecord> {
        self.record.as_ref()
    }

    #[must_use]
    pub const fn fields_disabled(&self) -> bool {
        self.phase.fields_disabled()
    }

    /// Submit control state: enabled, dirty and valid.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.fields_disabled()
            && self.record.is_some()
            && self.form.is_dirty()
            && self.form.is_valid()
    }

    /// Delete control state.
    #[must_use]
    pub const fn can_delete(&self) -> bool {
        !self.fields_disabled() && self.record.is_some()
    }

    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            phase: self.phase,
            form: self.form.snapshot(),
            fields_disabled: self.fields_disabled(),
            can_submit: self.can_submit(),
            can_delete: self.can_delete(),
            last_updated: self.record.as_ref().map(|r| r.updated_at),
        }
    }

    // -----------------------------------------------------------------------
    // User events
    // -----------------------------------------------------------------------

    /// The user edited the name field.
    pub fn change_name(&mut self, value: impl Into<String>) {
        if self.fields_disabled() {
            debug!(dialog = %self.descriptor.id, "input ignored: fields disabled");
            return;
        }
        self.form.set_name(value);
        if self.phase == Phase::ReadyWithServerError {
            self.phase = Phase::Ready;
        }
    }

    /// The user submitted the form.
    ///
    /// Returns the update intent to dispatch, or `None` when the submission
    /// is skipped (disabled, unchanged, invalid, or no record). The dialog
    /// stays open; closing on success is up to whoever consumes the intent.
    pub fn submit(&mut self, sanitizer: &impl Sanitizer) -> Option<UpdateIntent> {
        if self.fields_disabled() {
            debug!(dialog = %self.descriptor.id, phase = ?self.phase, "submit skipped: fields disabled");
            return None;
        }

        let valid = self.form.validate_all();
        let dirty = self.form.is_dirty();
        if !dirty || !valid {
            debug!(dialog = %self.descriptor.id, dirty, valid, "submit skipped");
            return None;
        }

        let Some(record) = &self.record else {
            debug!(dialog = %self.descriptor.id, "submit skipped: no record loaded");
            return None;
        };

        let sanitized = sanitizer.sanitize(&self.form.values().name);
        let name = match Slug::new(sanitized) {
            Ok(name) => name,
            Err(err) => {
                debug!(
                    dialog = %self.descriptor.id,
                    code = %err.code(),
                    "submit skipped: name sanitized to nothing"
                );
                self.form.mark_blank(NAME_FIELD);
                return None;
            }
        };

        let intent = UpdateIntent {
            close_dialog_id: DialogId::from(&record.id),
            form_data: TagFormData { name },
            tag: record.clone(),
        };

        self.in_flight = true;
        self.phase = Phase::Submitting;
        info!(
            dialog = %self.descriptor.id,
            tag = %record.id,
            name = %intent.form_data.name,
            "update intent built"
        );
        Some(intent)
    }

    /// The store refused to accept the update built by [`submit`](Self::submit).
    pub fn submit_rejected(&mut self, error: &ServerError) {
        self.in_flight = false;
        self.phase = Phase::Ready;
        self.on_external_error(error);
    }

    /// The user asked to delete the tag.
    ///
    /// Returns the confirmation handoff, or `None` when no record is loaded
    /// or the controls are disabled. Nothing is deleted or closed here.
    #[must_use]
    pub fn delete(&self) -> Option<ConfirmIntent> {
        let Some(record) = &self.record else {
            debug!(dialog = %self.descriptor.id, "delete skipped: no record loaded");
            return None;
        };
        if self.fields_disabled() {
            debug!(dialog = %self.descriptor.id, phase = ?self.phase, "delete skipped: fields disabled");
            return None;
        }

        Some(ConfirmIntent {
            close_dialog_id: self.descriptor.id.clone(),
            document_id: record.id.clone(),
            document_type: DocumentType::Tag,
        })
    }

    /// The user closed the dialog. Returns the id to remove.
    #[must_use]
    pub fn close(&self) -> DialogId {
        self.descriptor.id.clone()
    }

    // -----------------------------------------------------------------------
    // Store observation
    // -----------------------------------------------------------------------

    /// Show a store error on the name field.
    pub fn on_external_error(&mut self, error: &ServerError) {
        warn!(dialog = %self.descriptor.id, error = %error.message, "server error surfaced");
        self.form.inject_error(NAME_FIELD, &error.message);
        if !self.fields_disabled() {
            self.phase = Phase::ReadyWithServerError;
        }
    }

    /// Apply a new snapshot of the bound record.
    ///
    /// Error injection is level-triggered on the record's `error`: it fires
    /// whenever the error differs from the last one observed and is set.
    pub fn observe(&mut self, item: Option<&TagItem>) {
        let Some(item) = item else {
            if self.record.is_some() {
                debug!(dialog = %self.descriptor.id, "bound record disappeared");
            }
            self.record = None;
            self.last_error = None;
            self.in_flight = false;
            self.phase = Phase::Loading;
            return;
        };

        let previous = self.phase;
        self.record = Some(item.tag.clone());

        let settled = !item.updating;
        let resolved_submit = self.in_flight && settled;
        if resolved_submit {
            self.in_flight = false;
        }

        // Leaving Loading only refreshes a pristine form; typed input survives
        // requests started by other editors of the same record.
        let reseed = settled
            && (!self.seeded
                || (resolved_submit && item.error.is_none())
                || (previous == Phase::Loading && !self.form.is_dirty()));
        if reseed {
            self.form.reset(TagFormValues::new(item.tag.name.current()));
            self.seeded = true;
        }

        let error_changed = item.error != self.last_error;
        self.last_error.clone_from(&item.error);

        let mut surfaced = false;
        if let Some(err) = &item.error {
            if error_changed || resolved_submit {
                warn!(dialog = %self.descriptor.id, error = %err.message, "server error surfaced");
                self.form.inject_error(NAME_FIELD, &err.message);
                surfaced = true;
            }
        }

        self.phase = if item.updating {
            if self.in_flight {
                Phase::Submitting
            } else {
                Phase::Loading
            }
        } else if surfaced {
            Phase::ReadyWithServerError
        } else {
            match previous {
                Phase::Loading | Phase::Submitting => Phase::Ready,
                other => other,
            }
        };

        if previous != self.phase {
            debug!(
                dialog = %self.descriptor.id,
                from = ?previous,
                to = ?self.phase,
                "phase changed"
            );
        }
    }
}
