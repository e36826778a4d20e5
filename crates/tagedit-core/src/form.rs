//! Form state for one open edit dialog: current values, the values it was
//! seeded with, and per-field errors.

use serde::Serialize;

use crate::validate::{FieldError, FieldErrors, NAME_FIELD, Schema, TagFormValues};

/// Values and errors of the tag edit form.
///
/// Validation is on-change: every [`set_name`](Self::set_name) re-runs the
/// schema for the field, replacing whatever error it held.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: Schema,
    defaults: TagFormValues,
    values: TagFormValues,
    errors: FieldErrors,
}

/// Serializable view of a [`FormState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub values: TagFormValues,
    pub field_errors: FieldErrors,
    pub is_dirty: bool,
    pub is_valid: bool,
}

impl FormState {
    /// A pristine form seeded with `defaults`. No errors are shown until the
    /// first edit.
    #[must_use]
    pub fn new(schema: Schema, defaults: TagFormValues) -> Self {
        Self {
            schema,
            values: defaults.clone(),
            defaults,
            errors: FieldErrors::default(),
        }
    }

    #[must_use]
    pub const fn values(&self) -> &TagFormValues {
        &self.values
    }

    #[must_use]
    pub const fn defaults(&self) -> &TagFormValues {
        &self.defaults
    }

    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Message currently shown under the name field, if any.
    #[must_use]
    pub fn name_error(&self) -> Option<&str> {
        self.errors.get(NAME_FIELD).map(|e| e.message.as_str())
    }

    /// Current values differ from the seeded ones.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.values != self.defaults
    }

    /// Current values pass the schema and no field holds an error.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.schema.validate(&self.values).is_empty()
    }

    /// Update the name and re-validate it.
    pub fn set_name(&mut self, value: impl Into<String>) {
        self.values.name = value.into();
        match self.schema.check_field(NAME_FIELD, &self.values.name) {
            Some(err) => self.errors.set(NAME_FIELD, err),
            None => self.errors.clear(NAME_FIELD),
        }
    }

    /// Run the whole schema and show every failure. Returns validity.
    pub fn validate_all(&mut self) -> bool {
        let schema_errors = self.schema.validate(&self.values);
        for (field, err) in schema_errors.iter() {
            self.errors.set(field, err.clone());
        }
        self.is_valid()
    }

    /// Show `message` on `field` regardless of the schema. Returns `false`
    /// when the identical error is already shown.
    pub fn inject_error(&mut self, field: &str, message: &str) -> bool {
        self.errors.inject(field, message)
    }

    /// Show the schema's error for a blank `field`, used when a value that
    /// passed validation sanitizes to nothing.
    pub fn mark_blank(&mut self, field: &str) {
        let err = self
            .schema
            .check_field(field, "")
            .unwrap_or_else(|| FieldError::validation(format!("{field} cannot be empty")));
        self.errors.set(field, err);
    }

    /// Re-seed the form: new defaults, values follow, errors cleared.
    pub fn reset(&mut self, defaults: TagFormValues) {
        self.values = defaults.clone();
        self.defaults = defaults;
        self.errors.clear_all();
    }

    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            values: self.values.clone(),
            field_errors: self.errors.clone(),
            is_dirty: self.is_dirty(),
            is_valid: self.is_valid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ErrorSource;

    fn form(name: &str) -> FormState {
        FormState::new(Schema::tag("Name cannot be empty"), TagFormValues::new(name))
    }

    #[test]
    fn pristine_form_is_clean_and_valid() {
        let f = form("draft");
        assert!(!f.is_dirty());
        assert!(f.is_valid());
        assert!(f.name_error().is_none());
    }

    #[test]
    fn pristine_form_with_blank_default_is_invalid_but_silent() {
        let f = form("");
        assert!(!f.is_valid());
        assert!(f.name_error().is_none());
    }

    #[test]
    fn editing_marks_dirty_and_revalidates() {
        let mut f = form("draft");
        f.set_name("Draft ");
        assert!(f.is_dirty());
        assert!(f.is_valid());

        f.set_name("  ");
        assert!(!f.is_valid());
        assert_eq!(f.name_error(), Some("Name cannot be empty"));

        f.set_name("draft");
        assert!(!f.is_dirty());
        assert!(f.name_error().is_none());
    }

    #[test]
    fn injected_error_invalidates_until_next_edit() {
        let mut f = form("draft");
        f.set_name("taken");
        assert!(f.inject_error(NAME_FIELD, "duplicate name"));
        assert!(!f.is_valid());
        assert_eq!(
            f.errors().get(NAME_FIELD).map(|e| e.source),
            Some(ErrorSource::Server)
        );

        f.set_name("taken-2");
        assert!(f.is_valid());
        assert!(f.name_error().is_none());
    }

    #[test]
    fn validate_all_surfaces_schema_errors() {
        let mut f = form("");
        assert!(!f.validate_all());
        assert_eq!(f.name_error(), Some("Name cannot be empty"));
    }

    #[test]
    fn mark_blank_uses_schema_message() {
        let mut f = form("draft");
        f.set_name("???");
        f.mark_blank(NAME_FIELD);
        assert_eq!(f.name_error(), Some("Name cannot be empty"));
        assert!(!f.is_valid());
    }

    #[test]
    fn reset_reseeds_and_clears() {
        let mut f = form("draft");
        f.set_name("Draft");
        f.inject_error(NAME_FIELD, "boom");
        f.reset(TagFormValues::new("Draft"));
        assert!(!f.is_dirty());
        assert!(f.is_valid());
        assert_eq!(f.values().name, "Draft");
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let mut f = form("draft");
        f.set_name("");
        let value = serde_json::to_value(f.snapshot()).expect("serialize");
        assert_eq!(value["values"]["name"], "");
        assert_eq!(value["isDirty"], true);
        assert_eq!(value["isValid"], false);
        assert_eq!(value["fieldErrors"]["name"]["message"], "Name cannot be empty");
        assert_eq!(value["fieldErrors"]["name"]["source"], "validation");
    }
}
