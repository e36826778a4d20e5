//! Field-level schema validation for the tag edit form.
//!
//! Validation runs synchronously on every value change. Errors from outside
//! the schema (the store rejecting an update) go through the same per-field
//! error slots via [`FieldErrors::inject`], bypassing the schema check.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the only editable field.
pub const NAME_FIELD: &str = "name";

/// Where a field error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSource {
    /// Produced by the schema on this side.
    Validation,
    /// Reported by the store after a request failed.
    Server,
}

/// One error attached to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub message: String,
    pub source: ErrorSource,
}

impl FieldError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: ErrorSource::Validation,
        }
    }

    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: ErrorSource::Server,
        }
    }
}

/// Editable values of the tag form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFormValues {
    pub name: String,
}

impl TagFormValues {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Look up a field value by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            NAME_FIELD => Some(&self.name),
            _ => None,
        }
    }
}

/// A single validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// The value must contain at least one non-whitespace character.
    Required { message: String },
}

impl Rule {
    fn check(&self, value: &str) -> Option<FieldError> {
        match self {
            Self::Required { message } => {
                if value.trim().is_empty() {
                    Some(FieldError::validation(message.clone()))
                } else {
                    None
                }
            }
        }
    }
}

/// Ordered set of rules per field. The first failing rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    rules: Vec<(&'static str, Rule)>,
}

impl Schema {
    /// Schema for the tag form: `name` is required.
    #[must_use]
    pub fn tag(required_message: impl Into<String>) -> Self {
        Self {
            rules: vec![(
                NAME_FIELD,
                Rule::Required {
                    message: required_message.into(),
                },
            )],
        }
    }

    /// Run the rules for one field against `value`.
    #[must_use]
    pub fn check_field(&self, field: &str, value: &str) -> Option<FieldError> {
        self.rules
            .iter()
            .filter(|(name, _)| *name == field)
            .find_map(|(_, rule)| rule.check(value))
    }

    /// Run every rule against `values`.
    #[must_use]
    pub fn validate(&self, values: &TagFormValues) -> FieldErrors {
        let mut errors = FieldErrors::default();
        for (field, _) in &self.rules {
            if errors.get(field).is_some() {
                continue;
            }
            let value = values.get(field).unwrap_or_default();
            if let Some(err) = self.check_field(field, value) {
                errors.set(field, err);
            }
        }
        errors
    }
}

/// Per-field error slots. Each field holds at most one error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, FieldError>);

impl FieldErrors {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Replace the error held by `field`.
    pub fn set(&mut self, field: &str, error: FieldError) {
        self.0.insert(field.to_string(), error);
    }

    /// Set a server error on `field` without consulting the schema.
    ///
    /// Returns `false` when the field already holds the identical error.
    pub fn inject(&mut self, field: &str, message: &str) -> bool {
        let error = FieldError::server(message);
        if self.0.get(field) == Some(&error) {
            return false;
        }
        self.0.insert(field.to_string(), error);
        true
    }

    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn clear_all(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::tag("Name cannot be empty")
    }

    #[test]
    fn required_rejects_empty_and_blank() {
        let s = schema();
        for value in ["", " ", "\t\n", "   "] {
            let err = s.check_field(NAME_FIELD, value).expect("blank must fail");
            assert_eq!(err.message, "Name cannot be empty");
            assert_eq!(err.source, ErrorSource::Validation);
        }
    }

    #[test]
    fn required_accepts_visible_text() {
        let s = schema();
        assert!(s.check_field(NAME_FIELD, "draft").is_none());
        assert!(s.check_field(NAME_FIELD, " draft ").is_none());
    }

    #[test]
    fn unknown_fields_have_no_rules() {
        assert!(schema().check_field("color", "").is_none());
    }

    #[test]
    fn validate_collects_field_errors() {
        let errors = schema().validate(&TagFormValues::new(" "));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(NAME_FIELD).map(|e| e.message.as_str()),
            Some("Name cannot be empty")
        );
        assert!(schema().validate(&TagFormValues::new("ok")).is_empty());
    }

    #[test]
    fn inject_is_idempotent_for_identical_messages() {
        let mut errors = FieldErrors::default();
        assert!(errors.inject(NAME_FIELD, "duplicate name"));
        assert!(!errors.inject(NAME_FIELD, "duplicate name"));
        assert_eq!(errors.len(), 1);
        assert!(errors.inject(NAME_FIELD, "forbidden"));
        assert_eq!(
            errors.get(NAME_FIELD).map(|e| e.message.as_str()),
            Some("forbidden")
        );
    }

    #[test]
    fn inject_replaces_validation_error() {
        let mut errors = schema().validate(&TagFormValues::new(""));
        assert!(errors.inject(NAME_FIELD, "duplicate name"));
        let err = errors.get(NAME_FIELD).expect("error present");
        assert_eq!(err.source, ErrorSource::Server);
    }
}
