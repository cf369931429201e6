//! Shared primitives for all Rust crates in Dynaform.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;
mod field_errors;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::UserIdentity;
pub use field_errors::{FieldErrors, NON_FIELD_ERRORS};

/// Result type used across Dynaform crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant that is not tied to one field.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid input reported per offending field.
    #[error("validation error: {0}")]
    InvalidFields(FieldErrors),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Operation is switched off for the requested surface.
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds a single-field validation error.
    #[must_use]
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFields(FieldErrors::single(field, message))
    }
}

impl From<FieldErrors> for AppError {
    fn from(value: FieldErrors) -> Self {
        Self::InvalidFields(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn field_error_constructor_keys_message_by_field() {
        let error = AppError::field("name", "already taken");
        let AppError::InvalidFields(errors) = error else {
            unreachable!()
        };
        assert_eq!(errors.messages("name"), Some(&["already taken".to_owned()][..]));
    }
}
