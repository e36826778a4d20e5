//! Dialog manager: the stack of open dialogs, addressed by id.

use serde::Serialize;
use tracing::debug;

use crate::model::{ConfirmIntent, DialogDescriptor, DialogId};

/// What the edit dialog needs from the dialog manager.
pub trait DialogManager {
    /// Whether `id` is currently in the stack.
    fn is_open(&self, id: &DialogId) -> bool;

    /// Remove a dialog. Returns `false` if it was not open.
    fn remove(&mut self, id: &DialogId) -> bool;

    /// Open a delete confirmation on top of the stack and return its id.
    fn open_confirm(&mut self, intent: ConfirmIntent) -> DialogId;
}

/// One entry in the dialog stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpenDialog {
    TagEdit(DialogDescriptor),
    DeleteConfirm {
        id: DialogId,
        #[serde(flatten)]
        intent: ConfirmIntent,
    },
}

impl OpenDialog {
    #[must_use]
    pub const fn id(&self) -> &DialogId {
        match self {
            Self::TagEdit(descriptor) => &descriptor.id,
            Self::DeleteConfirm { id, .. } => id,
        }
    }
}

/// In-memory dialog stack. The last entry is the topmost dialog.
#[derive(Debug, Default)]
pub struct DialogStack {
    dialogs: Vec<OpenDialog>,
    confirm_seq: u64,
}

impl DialogStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an edit dialog. Re-opening an id that is already open moves it to
    /// the top instead of stacking a duplicate.
    pub fn open_tag_edit(&mut self, descriptor: DialogDescriptor) {
        self.dialogs.retain(|d| d.id() != &descriptor.id);
        self.dialogs.push(OpenDialog::TagEdit(descriptor));
    }

    #[must_use]
    pub fn contains(&self, id: &DialogId) -> bool {
        self.dialogs.iter().any(|d| d.id() == id)
    }

    #[must_use]
    pub fn top(&self) -> Option<&OpenDialog> {
        self.dialogs.last()
    }

    #[must_use]
    pub fn dialogs(&self) -> &[OpenDialog] {
        &self.dialogs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    /// Handoff payload of an open confirmation dialog.
    #[must_use]
    pub fn confirm_intent(&self, id: &DialogId) -> Option<&ConfirmIntent> {
        self.dialogs.iter().find_map(|d| match d {
            OpenDialog::DeleteConfirm { id: confirm_id, intent } if confirm_id == id => Some(intent),
            _ => None,
        })
    }
}

impl DialogManager for DialogStack {
    fn is_open(&self, id: &DialogId) -> bool {
        self.contains(id)
    }

    fn remove(&mut self, id: &DialogId) -> bool {
        let before = self.dialogs.len();
        self.dialogs.retain(|d| d.id() != id);
        let removed = self.dialogs.len() != before;
        if !removed {
            debug!(dialog = %id, "remove ignored: dialog not open");
        }
        removed
    }

    fn open_confirm(&mut self, intent: ConfirmIntent) -> DialogId {
        self.confirm_seq += 1;
        let id = DialogId::new(format!("confirm-{}", self.confirm_seq));
        debug!(dialog = %id, document = %intent.document_id, "confirm dialog opened");
        self.dialogs.push(OpenDialog::DeleteConfirm {
            id: id.clone(),
            intent,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentType, EntityId};

    fn edit(id: &str, tag: &str) -> DialogDescriptor {
        DialogDescriptor {
            id: DialogId::new(id),
            tag_id: EntityId::new(tag),
        }
    }

    fn confirm(close: &str, doc: &str) -> ConfirmIntent {
        ConfirmIntent {
            close_dialog_id: DialogId::new(close),
            document_id: EntityId::new(doc),
            document_type: DocumentType::Tag,
        }
    }

    #[test]
    fn confirm_stacks_on_top() {
        let mut stack = DialogStack::new();
        stack.open_tag_edit(edit("t1", "t1"));
        let confirm_id = stack.open_confirm(confirm("t1", "t1"));

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top().map(OpenDialog::id), Some(&confirm_id));
        assert_eq!(
            stack.confirm_intent(&confirm_id).map(|c| c.document_id.as_str()),
            Some("t1")
        );
    }

    #[test]
    fn confirm_ids_are_unique() {
        let mut stack = DialogStack::new();
        let a = stack.open_confirm(confirm("t1", "t1"));
        let b = stack.open_confirm(confirm("t2", "t2"));
        assert_ne!(a, b);
    }

    #[test]
    fn remove_reports_whether_anything_closed() {
        let mut stack = DialogStack::new();
        stack.open_tag_edit(edit("t1", "t1"));
        assert!(stack.remove(&DialogId::new("t1")));
        assert!(!stack.remove(&DialogId::new("t1")));
        assert!(stack.is_empty());
    }

    #[test]
    fn reopening_moves_to_top() {
        let mut stack = DialogStack::new();
        stack.open_tag_edit(edit("t1", "t1"));
        stack.open_tag_edit(edit("t2", "t2"));
        stack.open_tag_edit(edit("t1", "t1"));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top().map(|d| d.id().as_str()), Some("t1"));
    }

    #[test]
    fn open_dialogs_serialize_with_kind() {
        let mut stack = DialogStack::new();
        stack.open_tag_edit(edit("d1", "t1"));
        stack.open_confirm(confirm("d1", "t1"));
        let value = serde_json::to_value(stack.dialogs()).expect("serialize");
        assert_eq!(value[0]["kind"], "tag_edit");
        assert_eq!(value[0]["tagId"], "t1");
        assert_eq!(value[1]["kind"], "delete_confirm");
        assert_eq!(value[1]["closeDialogId"], "d1");
        assert_eq!(value[1]["documentType"], "tag");
    }
}
