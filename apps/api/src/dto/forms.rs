use dynaform_domain::{FieldDefinition, FormSchema};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::FieldTypeResponse;

/// Incoming payload for form creation.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-form-request.ts"
)]
pub struct CreateFormRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Incoming payload for partial form updates.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-form-request.ts"
)]
pub struct UpdateFormRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Field as embedded in its form.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-field-response.ts"
)]
pub struct FormFieldResponse {
    pub id: i64,
    pub field_type: FieldTypeResponse,
    pub name: String,
    pub is_required: bool,
    pub choices: Option<Vec<String>>,
}

/// API representation of a form with its ordered fields.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-response.ts"
)]
pub struct FormResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub fields: Vec<FormFieldResponse>,
}

impl From<&FieldDefinition> for FormFieldResponse {
    fn from(value: &FieldDefinition) -> Self {
        Self {
            id: value.id().as_i64(),
            field_type: FieldTypeResponse::from(value.field_type()),
            name: value.name().as_str().to_owned(),
            is_required: value.is_required(),
            choices: value.choices().map(<[String]>::to_vec),
        }
    }
}

impl From<FormSchema> for FormResponse {
    fn from(value: FormSchema) -> Self {
        let (form, fields) = value.into_parts();
        Self {
            id: form.id().as_i64(),
            name: form.name().as_str().to_owned(),
            description: form.description().map(str::to_owned),
            is_active: form.is_active(),
            created_at: form.created_at().to_rfc3339(),
            fields: fields.iter().map(FormFieldResponse::from).collect(),
        }
    }
}
