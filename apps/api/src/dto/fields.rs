use dynaform_application::FieldDetail;
use dynaform_domain::FormDefinition;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::FieldTypeResponse;

/// Incoming payload for field creation.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-field-request.ts"
)]
pub struct CreateFieldRequest {
    pub form_id: Option<i64>,
    pub field_type_id: Option<i64>,
    pub name: Option<String>,
    pub is_required: Option<bool>,
    pub choices: Option<Vec<String>>,
}

/// Incoming payload for partial field updates. Omitted references keep
/// their current values.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-field-request.ts"
)]
pub struct UpdateFieldRequest {
    pub form_id: Option<i64>,
    pub field_type_id: Option<i64>,
    pub name: Option<String>,
    pub is_required: Option<bool>,
    pub choices: Option<Vec<String>>,
}

/// Summary of the form a field belongs to.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-form-response.ts"
)]
pub struct FieldFormResponse {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

/// API representation of a field with its owning form and type.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-response.ts"
)]
pub struct FieldResponse {
    pub id: i64,
    pub form: FieldFormResponse,
    pub field_type: FieldTypeResponse,
    pub name: String,
    pub is_required: bool,
    pub choices: Option<Vec<String>>,
}

impl From<&FormDefinition> for FieldFormResponse {
    fn from(value: &FormDefinition) -> Self {
        Self {
            id: value.id().as_i64(),
            name: value.name().as_str().to_owned(),
            is_active: value.is_active(),
        }
    }
}

impl From<FieldDetail> for FieldResponse {
    fn from(value: FieldDetail) -> Self {
        let FieldDetail { field, form } = value;
        Self {
            id: field.id().as_i64(),
            form: FieldFormResponse::from(&form),
            field_type: FieldTypeResponse::from(field.field_type()),
            name: field.name().as_str().to_owned(),
            is_required: field.is_required(),
            choices: field.choices().map(<[String]>::to_vec),
        }
    }
}
