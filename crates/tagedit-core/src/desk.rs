//! Host side of the edit workflow: the shared store and dialog stack, plus
//! the reactions that belong to neither the edit dialog nor the store.
//!
//! - A successful update closes the dialog named by the update intent.
//! - The delete confirmation dialog performs the delete and, on success,
//!   closes the dialog named by its handoff payload.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::dialog::{DialogManager, DialogStack, OpenDialog};
use crate::model::{DialogDescriptor, DialogId, EntityId, ServerError, TagRecord};
use crate::store::{MemoryTagStore, Resolution, StoreError, TagStore};

/// Errors from host-side operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeskError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The id does not name an open confirmation dialog.
    #[error("no delete confirmation open with id {0}")]
    NoConfirmation(DialogId),
}

impl DeskError {
    #[must_use]
    pub const fn code(&self) -> crate::error::ErrorCode {
        match self {
            Self::Store(err) => err.code(),
            Self::NoConfirmation(_) => crate::error::ErrorCode::DialogNotFound,
        }
    }
}

/// Shared store and dialog stack of one running application.
#[derive(Debug, Default)]
pub struct Desk {
    pub store: MemoryTagStore,
    pub dialogs: DialogStack,
}

impl Desk {
    #[must_use]
    pub fn new(records: impl IntoIterator<Item = TagRecord>) -> Self {
        Self {
            store: MemoryTagStore::with_records(records),
            dialogs: DialogStack::new(),
        }
    }

    /// Open an edit dialog for `tag_id`, using the tag id as dialog id.
    pub fn open_tag_edit(&mut self, tag_id: &EntityId) -> DialogDescriptor {
        let descriptor = DialogDescriptor {
            id: DialogId::from(tag_id),
            tag_id: tag_id.clone(),
        };
        self.dialogs.open_tag_edit(descriptor.clone());
        descriptor
    }

    /// Complete the pending update for `id`; on success close the dialog the
    /// update intent named.
    ///
    /// # Errors
    ///
    /// Returns an error if no update is pending for `id`.
    pub fn resolve_update(
        &mut self,
        id: &EntityId,
        outcome: Result<DateTime<Utc>, ServerError>,
    ) -> Result<Resolution, DeskError> {
        let resolution = self.store.resolve_update(id, outcome)?;
        if let Resolution::Succeeded {
            close_dialog_id: Some(dialog),
        } = &resolution
        {
            self.dialogs.remove(dialog);
        }
        Ok(resolution)
    }

    /// The topmost open confirmation dialog, if any.
    #[must_use]
    pub fn top_confirmation(&self) -> Option<DialogId> {
        self.dialogs.dialogs().iter().rev().find_map(|d| match d {
            OpenDialog::DeleteConfirm { id, .. } => Some(id.clone()),
            OpenDialog::TagEdit(_) => None,
        })
    }

    /// The user confirmed deletion: dispatch the delete to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if `confirm_id` is not an open confirmation or the
    /// store refuses the delete.
    pub fn confirm_delete(&mut self, confirm_id: &DialogId) -> Result<EntityId, DeskError> {
        let intent = self
            .dialogs
            .confirm_intent(confirm_id)
            .ok_or_else(|| DeskError::NoConfirmation(confirm_id.clone()))?;
        let document_id = intent.document_id.clone();
        self.store.dispatch_delete(&document_id)?;
        info!(confirm = %confirm_id, tag = %document_id, "delete dispatched");
        Ok(document_id)
    }

    /// Complete the delete started from `confirm_id`.
    ///
    /// On success the confirmation and the dialog it names are closed. On
    /// failure only the confirmation closes; the error lands on the record.
    ///
    /// # Errors
    ///
    /// Returns an error if `confirm_id` is not an open confirmation or no
    /// delete is pending for its document.
    pub fn resolve_delete(
        &mut self,
        confirm_id: &DialogId,
        outcome: Result<(), ServerError>,
    ) -> Result<Resolution, DeskError> {
        let intent = self
            .dialogs
            .confirm_intent(confirm_id)
            .cloned()
            .ok_or_else(|| DeskError::NoConfirmation(confirm_id.clone()))?;

        let resolution = self.store.resolve_delete(&intent.document_id, outcome)?;
        self.dialogs.remove(confirm_id);
        if matches!(resolution, Resolution::Succeeded { .. }) {
            self.dialogs.remove(&intent.close_dialog_id);
            debug!(closed = %intent.close_dialog_id, "delete cascaded to edit dialog");
        }
        Ok(resolution)
    }

    /// The user dismissed the confirmation without deleting.
    ///
    /// # Errors
    ///
    /// Returns an error if `confirm_id` is not an open confirmation.
    pub fn cancel_delete(&mut self, confirm_id: &DialogId) -> Result<(), DeskError> {
        if self.dialogs.confirm_intent(confirm_id).is_none() {
            return Err(DeskError::NoConfirmation(confirm_id.clone()));
        }
        self.dialogs.remove(confirm_id);
        Ok(())
    }
}
