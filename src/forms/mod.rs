//! Form layer
//!
//! Each form is the raw `application/x-www-form-urlencoded` body of one
//! page. Forms only carry the fields a user may edit: anything else in the
//! request body (an `author` or `post` field, say) is dropped by serde and
//! never reaches the database.
//!
//! `validate` turns a form into the typed input of a service call, or into
//! [`FieldErrors`] that the page renders next to the offending inputs.

mod account;
mod catalog;
mod post;

pub use account::{LoginForm, ProfileForm, RegistrationForm};
pub use catalog::{CategoryForm, LocationForm};
pub use post::{
    format_datetime_local, parse_datetime_local, CommentForm, ModerationForm, PostForm,
};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Key used for errors that do not belong to a single field
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Validation messages keyed by field name
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error set with a single message
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Ok(value)` when no error was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Trimmed value, or a "required" error when nothing is left
pub(crate) fn required(errors: &mut FieldErrors, field: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "This field is required.");
    }
    value.to_string()
}

/// HTML checkboxes are only submitted when ticked
pub(crate) fn checkbox(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("on" | "true" | "1" | "yes")
    )
}

/// Enforce a maximum length counted in characters
pub(crate) fn max_chars(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_collects_messages() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());

        errors.add("title", "too long");
        errors.add("title", "bad");
        errors.add("text", "required");

        assert!(errors.has("title"));
        assert_eq!(errors.get("title"), ["too long", "bad"]);
        assert!(errors.get("missing").is_empty());
        assert_eq!(errors.to_string(), "text: required; title: too long bad");
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn test_field_errors_serializes_as_map() {
        let errors = FieldErrors::single("slug", "taken");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"slug": ["taken"]}));
    }

    #[test]
    fn test_checkbox() {
        assert!(checkbox(&Some("on".into())));
        assert!(checkbox(&Some("true".into())));
        assert!(!checkbox(&None));
        assert!(!checkbox(&Some("off".into())));
    }

    #[test]
    fn test_required_trims() {
        let mut errors = FieldErrors::new();
        assert_eq!(required(&mut errors, "a", "  x "), "x");
        assert!(errors.is_empty());
        required(&mut errors, "b", "   ");
        assert!(errors.has("b"));
    }
}
