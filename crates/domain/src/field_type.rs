use std::str::FromStr;

use dynaform_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::FieldTypeId;

/// Closed set of field type codes a form field may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTypeCode {
    /// Free text input.
    Text,
    /// Numeric input.
    Number,
    /// Email address input.
    Email,
    /// Checkbox input.
    Boolean,
    /// Date input.
    Date,
    /// Single selection from declared choices.
    Dropdown,
}

/// Check applied to a submitted value once presence is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    /// Any JSON value is accepted.
    Presence,
    /// Value must be a JSON number.
    Numeric,
    /// Value must equal one of the field's declared choices.
    OneOfChoices,
}

impl FieldTypeCode {
    /// Returns all known codes.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[FieldTypeCode] = &[
            FieldTypeCode::Text,
            FieldTypeCode::Number,
            FieldTypeCode::Email,
            FieldTypeCode::Boolean,
            FieldTypeCode::Date,
            FieldTypeCode::Dropdown,
        ];

        ALL
    }

    /// Returns a stable storage value for the code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Email => "email",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Dropdown => "dropdown",
        }
    }

    /// Returns the value rule enforced on submissions.
    ///
    /// Text, email, boolean and date values are only checked for presence.
    #[must_use]
    pub fn value_rule(&self) -> ValueRule {
        match self {
            Self::Number => ValueRule::Numeric,
            Self::Dropdown => ValueRule::OneOfChoices,
            Self::Text | Self::Email | Self::Boolean | Self::Date => ValueRule::Presence,
        }
    }

    /// Returns whether fields of this type carry a choices list.
    #[must_use]
    pub fn uses_choices(&self) -> bool {
        self.value_rule() == ValueRule::OneOfChoices
    }
}

impl FromStr for FieldTypeCode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "email" => Ok(Self::Email),
            "boolean" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "dropdown" => Ok(Self::Dropdown),
            _ => Err(AppError::field(
                "code",
                format!("\"{value}\" is not a valid choice."),
            )),
        }
    }
}

/// Validated attributes of a field type before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypeDraft {
    name: NonEmptyString,
    code: FieldTypeCode,
    description: Option<String>,
    validation_metadata: Option<Value>,
}

impl FieldTypeDraft {
    /// Creates a validated field type draft.
    pub fn new(
        name: impl Into<String>,
        code: FieldTypeCode,
        description: Option<String>,
        validation_metadata: Option<Value>,
    ) -> AppResult<Self> {
        let name = crate::validated_name(name)?;

        if let Some(metadata) = &validation_metadata
            && !metadata.is_object()
        {
            return Err(AppError::field(
                "validation_metadata",
                "Validation metadata must be a JSON object.",
            ));
        }

        Ok(Self {
            name,
            code,
            description: crate::normalized_text(description),
            validation_metadata,
        })
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the type code.
    #[must_use]
    pub fn code(&self) -> FieldTypeCode {
        self.code
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the optional metadata object.
    #[must_use]
    pub fn validation_metadata(&self) -> Option<&Value> {
        self.validation_metadata.as_ref()
    }
}

/// Stored field type record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTypeDefinition {
    id: FieldTypeId,
    name: NonEmptyString,
    code: FieldTypeCode,
    description: Option<String>,
    validation_metadata: Option<Value>,
}

impl FieldTypeDefinition {
    /// Attaches a store-assigned identifier to a validated draft.
    #[must_use]
    pub fn from_draft(id: FieldTypeId, draft: FieldTypeDraft) -> Self {
        Self {
            id,
            name: draft.name,
            code: draft.code,
            description: draft.description,
            validation_metadata: draft.validation_metadata,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> FieldTypeId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the type code.
    #[must_use]
    pub fn code(&self) -> FieldTypeCode {
        self.code
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the optional metadata object.
    #[must_use]
    pub fn validation_metadata(&self) -> Option<&Value> {
        self.validation_metadata.as_ref()
    }

    /// Returns the editable attributes as a draft.
    #[must_use]
    pub fn to_draft(&self) -> FieldTypeDraft {
        FieldTypeDraft {
            name: self.name.clone(),
            code: self.code,
            description: self.description.clone(),
            validation_metadata: self.validation_metadata.clone(),
        }
    }
}
