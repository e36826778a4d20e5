//! Intents: descriptions of state changes handed to the store or the dialog
//! manager. Building an intent has no side effects; the receiver executes it.

use serde::{Deserialize, Serialize};

use super::tag::{DialogId, EntityId, Slug, TagRecord};

/// Identifies one open edit dialog and the tag it edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogDescriptor {
    pub id: DialogId,
    pub tag_id: EntityId,
}

/// Values submitted for a tag update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFormData {
    pub name: Slug,
}

/// Request to persist a renamed tag.
///
/// `close_dialog_id` names the dialog the store closes once the update
/// succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIntent {
    pub close_dialog_id: DialogId,
    pub form_data: TagFormData,
    pub tag: TagRecord,
}

/// Document types a confirmation dialog can delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Tag,
}

/// Handoff payload for the delete confirmation dialog.
///
/// The confirmation flow deletes `document_id` and, on success, closes
/// `close_dialog_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmIntent {
    pub close_dialog_id: DialogId,
    pub document_id: EntityId,
    pub document_type: DocumentType,
}
