//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod field;
mod field_type;
mod form;
mod ids;
mod submission;
mod submission_validation;

use dynaform_core::{AppResult, FieldErrors, NonEmptyString};

pub use access::{CrudAction, Permission, Resource, Surface};
pub use field::{FieldDefinition, FieldDraft};
pub use field_type::{FieldTypeCode, FieldTypeDefinition, FieldTypeDraft, ValueRule};
pub use form::{FormDefinition, FormDraft, FormSchema};
pub use ids::{FieldId, FieldTypeId, FormId, SubmissionId};
pub use submission::{Submission, SubmissionDraft};
pub use submission_validation::{REQUIRED_MESSAGE, SUBMITTED_DATA_KEY};

/// Maximum length of form, field and field type names.
pub const NAME_MAX_LENGTH: usize = 255;

pub(crate) fn name_error(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some("This field may not be blank.".to_owned());
    }

    if value.chars().count() > NAME_MAX_LENGTH {
        return Some(format!(
            "Ensure this field has no more than {NAME_MAX_LENGTH} characters."
        ));
    }

    None
}

pub(crate) fn validated_name(value: impl Into<String>) -> AppResult<NonEmptyString> {
    let value = value.into();
    if let Some(message) = name_error(value.as_str()) {
        return Err(FieldErrors::single("name", message).into());
    }

    NonEmptyString::new(value)
}

pub(crate) fn normalized_text(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

#[cfg(test)]
mod tests {
    use super::{NAME_MAX_LENGTH, name_error};

    #[test]
    fn names_are_bounded() {
        assert!(name_error("contact").is_none());
        assert!(name_error("  ").is_some());
        assert!(name_error(&"x".repeat(NAME_MAX_LENGTH + 1)).is_some());
    }
}
