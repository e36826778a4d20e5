use crate::error::ErrorCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier. No parsing or normalization is applied.
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

opaque_id!(
    /// Document id of an entity held by the store.
    ///
    /// Ids are opaque strings end to end. Numeric-looking ids are never
    /// parsed, so `"007"` and `"7"` are distinct tags.
    EntityId
);

opaque_id!(
    /// Identifier of one open dialog in the dialog stack.
    DialogId
);

impl From<&EntityId> for DialogId {
    fn from(id: &EntityId) -> Self {
        Self::new(id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Slug
// ---------------------------------------------------------------------------

/// Errors building a [`Slug`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    /// The sanitized value was empty.
    #[error("slug must not be empty")]
    Empty,
    /// The `_type` discriminator was something other than `"slug"`.
    #[error("expected _type \"slug\", found {0:?}")]
    WrongType(String),
}

impl SlugError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Empty | Self::WrongType(_) => ErrorCode::InvalidSlug,
        }
    }
}

/// Persisted shape of a tag's name: `{ "_type": "slug", "current": "..." }`.
///
/// `current` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SlugRepr", into = "SlugRepr")]
pub struct Slug {
    current: String,
}

#[derive(Serialize, Deserialize)]
struct SlugRepr {
    #[serde(rename = "_type")]
    kind: String,
    current: String,
}

const SLUG_TYPE: &str = "slug";

impl Slug {
    /// Build a slug from an already sanitized value.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if `current` is empty.
    pub fn new(current: impl Into<String>) -> Result<Self, SlugError> {
        let current = current.into();
        if current.is_empty() {
            return Err(SlugError::Empty);
        }
        Ok(Self { current })
    }

    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.current)
    }
}

impl TryFrom<SlugRepr> for Slug {
    type Error = SlugError;

    fn try_from(repr: SlugRepr) -> Result<Self, Self::Error> {
        if repr.kind != SLUG_TYPE {
            return Err(SlugError::WrongType(repr.kind));
        }
        Self::new(repr.current)
    }
}

impl From<Slug> for SlugRepr {
    fn from(slug: Slug) -> Self {
        Self {
            kind: SLUG_TYPE.to_string(),
            current: slug.current,
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A tag document as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub name: Slug,
    #[serde(rename = "_updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Error reported by the store for a failed request on one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ServerError {
    pub message: String,
}

impl ServerError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ServerRejected
    }
}

/// Store projection of one tag: the record plus its async request status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagItem {
    pub tag: TagRecord,
    #[serde(default)]
    pub updating: bool,
    #[serde(default)]
    pub error: Option<ServerError>,
}

impl TagItem {
    /// An idle item with no pending request and no error.
    #[must_use]
    pub const fn idle(tag: TagRecord) -> Self {
        Self {
            tag,
            updating: false,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, name: &str) -> TagRecord {
        TagRecord {
            id: EntityId::new(id),
            name: Slug::new(name).expect("non-empty slug"),
            updated_at: DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
                .expect("valid timestamp")
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn slug_rejects_empty() {
        assert_eq!(Slug::new(""), Err(SlugError::Empty));
        assert_eq!(Slug::new("draft").expect("slug").current(), "draft");
    }

    #[test]
    fn slug_serializes_with_type_discriminator() {
        let slug = Slug::new("Draft").expect("slug");
        let value = serde_json::to_value(&slug).expect("serialize");
        assert_eq!(value, json!({"_type": "slug", "current": "Draft"}));
    }

    #[test]
    fn slug_deserialize_checks_type_and_emptiness() {
        let wrong: Result<Slug, _> =
            serde_json::from_value(json!({"_type": "string", "current": "x"}));
        assert!(wrong.is_err());

        let empty: Result<Slug, _> = serde_json::from_value(json!({"_type": "slug", "current": ""}));
        assert!(empty.is_err());
    }

    #[test]
    fn record_uses_document_field_names() {
        let value = serde_json::to_value(record("t1", "draft")).expect("serialize");
        assert_eq!(value["_id"], "t1");
        assert_eq!(value["name"]["current"], "draft");
        assert!(value["_updatedAt"].is_string());
    }

    #[test]
    fn ids_stay_opaque_strings() {
        let a = EntityId::new("007");
        let b = EntityId::new("7");
        assert_ne!(a, b);
        assert_eq!(serde_json::to_value(&a).expect("serialize"), json!("007"));
        assert_eq!(DialogId::from(&a).as_str(), "007");
    }

    #[test]
    fn slug_and_server_errors_carry_codes() {
        assert_eq!(SlugError::Empty.code().code(), "E2003");
        assert_eq!(
            SlugError::WrongType("string".into()).code(),
            ErrorCode::InvalidSlug
        );
        assert_eq!(ServerError::new("duplicate name").code().code(), "E3002");
    }

    #[test]
    fn idle_item_has_no_status() {
        let item = TagItem::idle(record("t1", "draft"));
        assert!(!item.updating);
        assert!(item.error.is_none());
    }
}
