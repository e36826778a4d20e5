//! Tag entity store.
//!
//! The store owns tag records and executes update/delete requests. Callers
//! never mutate records directly; they dispatch intents and observe the
//! record's `updating` / `error` status through a [`Subscription`].
//!
//! [`MemoryTagStore`] keeps records in memory. Requests stay pending until
//! [`MemoryTagStore::resolve_update`] or [`MemoryTagStore::resolve_delete`]
//! completes them, which lets tests and the scenario runner drive the
//! asynchronous half explicitly.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::model::{DialogId, EntityId, ServerError, TagItem, TagRecord, UpdateIntent};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors returned when a request cannot be accepted or resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record with this id.
    #[error("tag not found: {0}")]
    NotFound(EntityId),

    /// A request for this record has not resolved yet.
    #[error("a request is already pending for tag {0}")]
    InFlight(EntityId),

    /// `resolve_*` was called with nothing of that kind pending.
    #[error("no pending {kind} request for tag {id}")]
    NothingPending { id: EntityId, kind: &'static str },
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> crate::error::ErrorCode {
        use crate::error::ErrorCode;
        match self {
            Self::NotFound(_) => ErrorCode::TagNotFound,
            Self::InFlight(_) => ErrorCode::UpdateInFlight,
            Self::NothingPending { .. } => ErrorCode::InternalUnexpected,
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Receives a snapshot of one record every time it changes.
///
/// `None` means the record no longer exists.
#[derive(Debug)]
pub struct Subscription {
    id: EntityId,
    rx: Receiver<Option<TagItem>>,
}

impl Subscription {
    #[must_use]
    pub const fn id(&self) -> &EntityId {
        &self.id
    }

    /// Next pending notification without blocking.
    #[must_use]
    pub fn try_next(&self) -> Option<Option<TagItem>> {
        match self.rx.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// All pending notifications, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Option<TagItem>> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// What the edit dialog needs from the entity store.
pub trait TagStore {
    /// Current projection of a record, or `None` if it is not loaded.
    fn select_by_id(&self, id: &EntityId) -> Option<TagItem>;

    /// Start persisting a rename. Completion is reported through the
    /// record's status, not through this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or already has a request
    /// in flight.
    fn dispatch_update(&mut self, intent: UpdateIntent) -> Result<(), StoreError>;

    /// Start deleting a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or already has a request
    /// in flight.
    fn dispatch_delete(&mut self, id: &EntityId) -> Result<(), StoreError>;

    /// Observe every future change of one record.
    fn subscribe(&mut self, id: &EntityId) -> Subscription;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Pending {
    Update(UpdateIntent),
    Delete,
}

impl Pending {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Update(_) => "update",
            Self::Delete => "delete",
        }
    }
}

/// How a completed request should be reflected by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The request succeeded. The named dialog should be closed.
    Succeeded { close_dialog_id: Option<DialogId> },
    /// The request failed; the error is now set on the record.
    Failed(ServerError),
}

/// In-memory [`TagStore`] with explicit request completion.
#[derive(Debug, Default)]
pub struct MemoryTagStore {
    items: HashMap<EntityId, TagItem>,
    pending: HashMap<EntityId, Pending>,
    subscribers: HashMap<EntityId, Vec<Sender<Option<TagItem>>>>,
}

impl MemoryTagStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding `records`, all idle.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = TagRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Add or replace a record. Its status is reset to idle.
    pub fn insert(&mut self, record: TagRecord) {
        let id = record.id.clone();
        self.items.insert(id.clone(), TagItem::idle(record));
        self.notify(&id);
    }

    /// Set or clear a record's error from outside the request lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the record does not exist.
    pub fn set_error(&mut self, id: &EntityId, error: Option<ServerError>) -> Result<(), StoreError> {
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        item.error = error;
        self.notify(id);
        Ok(())
    }

    /// Whether a request for `id` has not been resolved yet.
    #[must_use]
    pub fn is_pending(&self, id: &EntityId) -> bool {
        self.pending.contains_key(id)
    }

    /// Complete the pending update for `id`.
    ///
    /// On success the record takes the submitted name and `updated_at`.
    /// On failure the record keeps its name and `error` is set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NothingPending`] if no update is pending.
    pub fn resolve_update(
        &mut self,
        id: &EntityId,
        outcome: Result<DateTime<Utc>, ServerError>,
    ) -> Result<Resolution, StoreError> {
        let intent = match self.pending.remove(id) {
            Some(Pending::Update(intent)) => intent,
            Some(other) => {
                let kind = other.kind();
                self.pending.insert(id.clone(), other);
                debug!(tag = %id, pending = kind, "resolve_update with other request pending");
                return Err(StoreError::NothingPending {
                    id: id.clone(),
                    kind: "update",
                });
            }
            None => {
                return Err(StoreError::NothingPending {
                    id: id.clone(),
                    kind: "update",
                });
            }
        };

        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        item.updating = false;

        let resolution = match outcome {
            Ok(updated_at) => {
                item.tag.name = intent.form_data.name;
                item.tag.updated_at = updated_at;
                item.error = None;
                info!(tag = %id, name = %item.tag.name, "tag updated");
                Resolution::Succeeded {
                    close_dialog_id: Some(intent.close_dialog_id),
                }
            }
            Err(err) => {
                warn!(tag = %id, code = %err.code(), error = %err, "tag update failed");
                item.error = Some(err.clone());
                Resolution::Failed(err)
            }
        };

        self.notify(id);
        Ok(resolution)
    }

    /// Complete the pending delete for `id`. On success the record is
    /// removed and subscribers receive `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NothingPending`] if no delete is pending.
    pub fn resolve_delete(
        &mut self,
        id: &EntityId,
        outcome: Result<(), ServerError>,
    ) -> Result<Resolution, StoreError> {
        match self.pending.get(id) {
            Some(Pending::Delete) => {
                self.pending.remove(id);
            }
            _ => {
                return Err(StoreError::NothingPending {
                    id: id.clone(),
                    kind: "delete",
                });
            }
        }

        let resolution = match outcome {
            Ok(()) => {
                self.items.remove(id);
                info!(tag = %id, "tag deleted");
                Resolution::Succeeded {
                    close_dialog_id: None,
                }
            }
            Err(err) => {
                warn!(tag = %id, code = %err.code(), error = %err, "tag delete failed");
                if let Some(item) = self.items.get_mut(id) {
                    item.updating = false;
                    item.error = Some(err.clone());
                }
                Resolution::Failed(err)
            }
        };

        self.notify(id);
        Ok(resolution)
    }

    fn begin(&mut self, id: &EntityId, request: Pending) -> Result<(), StoreError> {
        if self.pending.contains_key(id) {
            return Err(StoreError::InFlight(id.clone()));
        }
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        item.updating = true;
        item.error = None;
        debug!(tag = %id, request = request.kind(), "request started");
        self.pending.insert(id.clone(), request);
        self.notify(id);
        Ok(())
    }

    fn notify(&mut self, id: &EntityId) {
        let snapshot = self.items.get(id).cloned();
        if let Some(senders) = self.subscribers.get_mut(id) {
            senders.retain(|tx| tx.send(snapshot.clone()).is_ok());
        }
    }
}

impl TagStore for MemoryTagStore {
    fn select_by_id(&self, id: &EntityId) -> Option<TagItem> {
        self.items.get(id).cloned()
    }

    fn dispatch_update(&mut self, intent: UpdateIntent) -> Result<(), StoreError> {
        let id = intent.tag.id.clone();
        self.begin(&id, Pending::Update(intent))
    }

    fn dispatch_delete(&mut self, id: &EntityId) -> Result<(), StoreError> {
        self.begin(id, Pending::Delete)
    }

    fn subscribe(&mut self, id: &EntityId) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers.entry(id.clone()).or_default().push(tx);
        Subscription { id: id.clone(), rx }
    }
}
