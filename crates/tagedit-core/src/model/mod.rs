pub mod intent;
pub mod tag;

pub use intent::{ConfirmIntent, DialogDescriptor, DocumentType, TagFormData, UpdateIntent};
pub use tag::{DialogId, EntityId, ServerError, Slug, SlugError, TagItem, TagRecord};
