//! Event loop for one open edit dialog.
//!
//! An [`EditSession`] owns the controller and its store subscription. Each
//! call to [`EditSession::handle`] runs one user event to completion: the
//! controller produces at most one [`Effect`], the session routes it to the
//! store or the dialog manager, then drains store notifications back into the
//! controller. The store and dialog manager are borrowed per call, so several
//! sessions (or a list view) can share them.

use serde::Serialize;
use tracing::{debug, warn};

use crate::controller::{ControllerSnapshot, EditDialogController};
use crate::dialog::DialogManager;
use crate::model::{ConfirmIntent, DialogDescriptor, DialogId, ServerError, UpdateIntent};
use crate::sanitize::Sanitizer;
use crate::store::{Subscription, TagStore};
use crate::validate::Schema;

/// A discrete user interaction with the edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    /// New value typed into the name field.
    Input(String),
    Submit,
    Delete,
    Close,
}

/// Side effect requested by the controller for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Effect {
    Update(UpdateIntent),
    OpenConfirm(ConfirmIntent),
    RemoveDialog(DialogId),
}

/// One edit dialog bound to a store subscription.
#[derive(Debug)]
pub struct EditSession<Z> {
    controller: EditDialogController,
    subscription: Subscription,
    sanitizer: Z,
}

impl<Z: Sanitizer> EditSession<Z> {
    /// Subscribe to the dialog's record and initialize the controller from
    /// its current snapshot.
    pub fn open<S: TagStore>(
        descriptor: DialogDescriptor,
        store: &mut S,
        schema: Schema,
        sanitizer: Z,
    ) -> Self {
        let subscription = store.subscribe(&descriptor.tag_id);
        let item = store.select_by_id(&descriptor.tag_id);
        let controller = EditDialogController::initialize(descriptor, item.as_ref(), schema);
        Self {
            controller,
            subscription,
            sanitizer,
        }
    }

    #[must_use]
    pub const fn controller(&self) -> &EditDialogController {
        &self.controller
    }

    #[must_use]
    pub fn id(&self) -> &DialogId {
        &self.controller.descriptor().id
    }

    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        self.controller.snapshot()
    }

    /// Whether the dialog is still in the manager's stack.
    #[must_use]
    pub fn is_open<D: DialogManager>(&self, dialogs: &D) -> bool {
        dialogs.is_open(self.id())
    }

    /// Run one user event to completion and return the effect it produced.
    ///
    /// Events for a dialog that is no longer open are ignored.
    pub fn handle<S: TagStore, D: DialogManager>(
        &mut self,
        event: DialogEvent,
        store: &mut S,
        dialogs: &mut D,
    ) -> Option<Effect> {
        if !self.is_open(dialogs) {
            debug!(dialog = %self.id(), ?event, "event ignored: dialog closed");
            return None;
        }

        let effect = match event {
            DialogEvent::Input(value) => {
                self.controller.change_name(value);
                None
            }
            DialogEvent::Submit => self.controller.submit(&self.sanitizer).map(Effect::Update),
            DialogEvent::Delete => self.controller.delete().map(Effect::OpenConfirm),
            DialogEvent::Close => Some(Effect::RemoveDialog(self.controller.close())),
        };

        if let Some(effect) = &effect {
            self.apply(effect.clone(), store, dialogs);
        }
        self.pump();
        effect
    }

    /// Feed pending store notifications to the controller. Returns how many
    /// snapshots were applied.
    pub fn pump(&mut self) -> usize {
        let pending = self.subscription.drain();
        let count = pending.len();
        for snapshot in pending {
            self.controller.observe(snapshot.as_ref());
        }
        count
    }

    fn apply<S: TagStore, D: DialogManager>(&mut self, effect: Effect, store: &mut S, dialogs: &mut D) {
        match effect {
            Effect::Update(intent) => {
                if let Err(err) = store.dispatch_update(intent) {
                    warn!(dialog = %self.id(), error = %err, "store refused update");
                    self.controller
                        .submit_rejected(&ServerError::new(err.to_string()));
                }
            }
            Effect::OpenConfirm(intent) => {
                let confirm_id = dialogs.open_confirm(intent);
                debug!(dialog = %self.id(), confirm = %confirm_id, "delete confirmation requested");
            }
            Effect::RemoveDialog(id) => {
                dialogs.remove(&id);
            }
        }
    }
}
