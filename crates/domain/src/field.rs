use std::collections::HashSet;

use dynaform_core::{AppResult, FieldErrors, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FieldId, FieldTypeDefinition, FormId, ValueRule};

/// Validated attributes of a field before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDraft {
    form_id: FormId,
    field_type: FieldTypeDefinition,
    name: NonEmptyString,
    is_required: bool,
    choices: Option<Vec<String>>,
}

impl FieldDraft {
    /// Creates a validated field draft.
    ///
    /// Dropdown fields need a non-empty list of distinct choices; every other
    /// type rejects choices. An empty list on a non-dropdown field is dropped.
    pub fn new(
        form_id: FormId,
        field_type: FieldTypeDefinition,
        name: impl Into<String>,
        is_required: bool,
        choices: Option<Vec<String>>,
    ) -> AppResult<Self> {
        let mut errors = FieldErrors::new();
        let name = name.into();

        if let Some(message) = crate::name_error(name.as_str()) {
            errors.push("name", message);
        }

        let choices = normalize_choices(&field_type, choices, &mut errors);
        errors.into_result()?;

        Ok(Self {
            form_id,
            field_type,
            name: NonEmptyString::new(name)?,
            is_required,
            choices,
        })
    }

    /// Returns the owning form.
    #[must_use]
    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    /// Returns the resolved field type.
    #[must_use]
    pub fn field_type(&self) -> &FieldTypeDefinition {
        &self.field_type
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns whether submissions must include the field.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// Returns the declared choices for dropdown fields.
    #[must_use]
    pub fn choices(&self) -> Option<&[String]> {
        self.choices.as_deref()
    }
}

fn normalize_choices(
    field_type: &FieldTypeDefinition,
    choices: Option<Vec<String>>,
    errors: &mut FieldErrors,
) -> Option<Vec<String>> {
    if !field_type.code().uses_choices() {
        return match choices {
            Some(values) if !values.is_empty() => {
                errors.push(
                    "choices",
                    format!(
                        "Choices are only allowed for {} fields.",
                        crate::FieldTypeCode::Dropdown.as_str()
                    ),
                );
                None
            }
            _ => None,
        };
    }

    let Some(values) = choices.filter(|values| !values.is_empty()) else {
        errors.push("choices", "Dropdown fields require at least one choice.");
        return None;
    };

    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim().to_owned();
        if trimmed.is_empty() {
            errors.push("choices", "Choices may not be blank.");
            continue;
        }

        if !seen.insert(trimmed.clone()) {
            errors.push("choices", format!("Duplicate choice \"{trimmed}\"."));
            continue;
        }

        normalized.push(trimmed);
    }

    Some(normalized)
}

/// Stored field record with its resolved field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    id: FieldId,
    form_id: FormId,
    field_type: FieldTypeDefinition,
    name: NonEmptyString,
    is_required: bool,
    choices: Option<Vec<String>>,
}

impl FieldDefinition {
    /// Attaches a store-assigned identifier to a validated draft.
    #[must_use]
    pub fn from_draft(id: FieldId, draft: FieldDraft) -> Self {
        Self {
            id,
            form_id: draft.form_id,
            field_type: draft.field_type,
            name: draft.name,
            is_required: draft.is_required,
            choices: draft.choices,
        }
    }

    /// Rebuilds a stored field.
    ///
    /// Choices are taken as persisted: a field whose type was later changed
    /// away from dropdown keeps them, and they are simply not consulted.
    pub fn restore(
        id: FieldId,
        form_id: FormId,
        field_type: FieldTypeDefinition,
        name: impl Into<String>,
        is_required: bool,
        choices: Option<Vec<String>>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            form_id,
            field_type,
            name: NonEmptyString::new(name)?,
            is_required,
            choices,
        })
    }

    /// Returns a copy bound to the current version of its field type.
    #[must_use]
    pub fn with_field_type(mut self, field_type: FieldTypeDefinition) -> Self {
        self.field_type = field_type;
        self
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Returns the owning form.
    #[must_use]
    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    /// Returns the resolved field type.
    #[must_use]
    pub fn field_type(&self) -> &FieldTypeDefinition {
        &self.field_type
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns whether submissions must include the field.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// Returns the declared choices for dropdown fields.
    #[must_use]
    pub fn choices(&self) -> Option<&[String]> {
        self.choices.as_deref()
    }

    /// Returns the message describing why a present value is rejected.
    #[must_use]
    pub fn value_error(&self, value: &Value) -> Option<String> {
        match self.field_type.code().value_rule() {
            ValueRule::Presence => None,
            ValueRule::Numeric => (!value.is_number()).then(|| "Must be a number.".to_owned()),
            ValueRule::OneOfChoices => {
                let selected = value.as_str();
                let is_declared = selected.is_some_and(|selected| {
                    self.choices()
                        .unwrap_or_default()
                        .iter()
                        .any(|choice| choice == selected)
                });
                if is_declared {
                    return None;
                }

                let rendered = selected
                    .map(str::to_owned)
                    .unwrap_or_else(|| value.to_string());
                Some(format!("\"{rendered}\" is not a valid choice."))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{FieldDefinition, FieldDraft};
    use crate::{FieldId, FieldTypeCode, FieldTypeDefinition, FieldTypeDraft, FieldTypeId, FormId};

    fn field_type(code: FieldTypeCode) -> FieldTypeDefinition {
        let draft = FieldTypeDraft::new(code.as_str(), code, None, None)
            .unwrap_or_else(|_| unreachable!());
        FieldTypeDefinition::from_draft(FieldTypeId::new(1), draft)
    }

    #[test]
    fn dropdown_requires_choices() {
        let result = FieldDraft::new(
            FormId::new(1),
            field_type(FieldTypeCode::Dropdown),
            "color",
            false,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn non_dropdown_rejects_choices_but_drops_empty_list() {
        let rejected = FieldDraft::new(
            FormId::new(1),
            field_type(FieldTypeCode::Text),
            "nickname",
            false,
            Some(vec!["a".to_owned()]),
        );
        assert!(rejected.is_err());

        let accepted = FieldDraft::new(
            FormId::new(1),
            field_type(FieldTypeCode::Text),
            "nickname",
            false,
            Some(Vec::new()),
        );
        assert!(accepted.is_ok());
        assert_eq!(accepted.ok().and_then(|draft| draft.choices().map(<[String]>::len)), None);
    }

    #[test]
    fn blank_name_and_duplicate_choices_are_reported_together() {
        let result = FieldDraft::new(
            FormId::new(1),
            field_type(FieldTypeCode::Dropdown),
            " ",
            false,
            Some(vec!["red".to_owned(), " red ".to_owned()]),
        );
        let Err(dynaform_core::AppError::InvalidFields(errors)) = result else {
            unreachable!()
        };
        assert!(errors.contains("name"));
        assert!(errors.contains("choices"));
    }

    #[test]
    fn dropdown_value_must_match_a_choice() {
        let draft = FieldDraft::new(
            FormId::new(1),
            field_type(FieldTypeCode::Dropdown),
            "color",
            true,
            Some(vec!["red".to_owned(), "blue".to_owned()]),
        )
        .unwrap_or_else(|_| unreachable!());
        let field = FieldDefinition::from_draft(FieldId::new(7), draft);

        assert_eq!(field.value_error(&json!("red")), None);
        assert!(field.value_error(&json!("green")).is_some());
        assert!(field.value_error(&json!(1)).is_some());
    }

    #[test]
    fn number_rule_rejects_numeric_strings_and_booleans() {
        let draft = FieldDraft::new(
            FormId::new(1),
            field_type(FieldTypeCode::Number),
            "age",
            false,
            None,
        )
        .unwrap_or_else(|_| unreachable!());
        let field = FieldDefinition::from_draft(FieldId::new(2), draft);

        assert_eq!(field.value_error(&json!(30)), None);
        assert_eq!(field.value_error(&json!(30.5)), None);
        assert!(field.value_error(&json!("30")).is_some());
        assert!(field.value_error(&json!(true)).is_some());
        assert!(field.value_error(&json!(null)).is_some());
    }
}
