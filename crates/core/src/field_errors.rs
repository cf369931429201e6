use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Error key used for problems that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Validation messages keyed by the offending field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Creates an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error set holding one message.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Appends a message for a field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Returns whether no message was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of fields with at least one message.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the field has at least one message.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Returns the messages recorded for a field.
    #[must_use]
    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Iterates over fields and their messages in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Returns `Ok(())` when empty, otherwise the collected errors.
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            return Ok(());
        }

        Err(AppError::InvalidFields(self))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            if !first {
                formatter.write_str("; ")?;
            }
            first = false;
            write!(formatter, "{field}: {}", messages.join(" "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FieldErrors;

    #[test]
    fn messages_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        errors.push("age", "Must be a number.");
        errors.push("age", "Must be positive.");
        errors.push("email", "This field is required.");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.messages("age").map(<[String]>::len), Some(2));
        assert_eq!(
            errors.to_string(),
            "age: Must be a number. Must be positive.; email: This field is required."
        );
    }

    #[test]
    fn empty_set_converts_to_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
        assert!(FieldErrors::single("name", "bad").into_result().is_err());
    }

    #[test]
    fn serializes_as_plain_map() {
        let errors = FieldErrors::single("email", "This field is required.");
        let value = serde_json::to_value(&errors);
        assert!(value.is_ok());
        assert_eq!(
            value.unwrap_or_default(),
            serde_json::json!({"email": ["This field is required."]})
        );
    }
}
