use std::collections::HashSet;

use chrono::{DateTime, Utc};
use dynaform_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{FieldDefinition, FormId};

/// Validated attributes of a form before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDraft {
    name: NonEmptyString,
    description: Option<String>,
    is_active: bool,
}

impl FormDraft {
    /// Creates a validated form draft.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        is_active: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            name: crate::validated_name(name)?,
            description: crate::normalized_text(description),
            is_active,
        })
    }

    /// Returns the form name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the form accepts new fields and submissions.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Stored form record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefinition {
    id: FormId,
    name: NonEmptyString,
    description: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl FormDefinition {
    /// Attaches store-assigned identity and creation time to a validated draft.
    #[must_use]
    pub fn from_draft(id: FormId, draft: FormDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            is_active: draft.is_active,
            created_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> FormId {
        self.id
    }

    /// Returns the form name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the form is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the editable attributes as a draft.
    #[must_use]
    pub fn to_draft(&self) -> FormDraft {
        FormDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            is_active: self.is_active,
        }
    }
}

/// A form together with its fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    form: FormDefinition,
    fields: Vec<FieldDefinition>,
}

impl FormSchema {
    /// Creates a schema snapshot, rejecting foreign or duplicate fields.
    pub fn new(form: FormDefinition, fields: Vec<FieldDefinition>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if field.form_id() != form.id() {
                return Err(AppError::Internal(format!(
                    "field '{}' belongs to form '{}', not '{}'",
                    field.name().as_str(),
                    field.form_id(),
                    form.id()
                )));
            }

            if !seen.insert(field.name().as_str()) {
                return Err(AppError::Internal(format!(
                    "duplicate field name '{}' in form '{}'",
                    field.name().as_str(),
                    form.id()
                )));
            }
        }

        Ok(Self { form, fields })
    }

    /// Returns the form record.
    #[must_use]
    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Splits the snapshot into its parts.
    #[must_use]
    pub fn into_parts(self) -> (FormDefinition, Vec<FieldDefinition>) {
        (self.form, self.fields)
    }
}
