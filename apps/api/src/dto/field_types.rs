use dynaform_domain::FieldTypeDefinition;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Incoming payload for field type creation.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-field-type-request.ts"
)]
pub struct CreateFieldTypeRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    #[ts(type = "Record<string, unknown> | null")]
    pub validation_metadata: Option<Value>,
}

/// Incoming payload for partial field type updates.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-field-type-request.ts"
)]
pub struct UpdateFieldTypeRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    #[ts(type = "Record<string, unknown> | null")]
    pub validation_metadata: Option<Value>,
}

/// API representation of a field type.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-type-response.ts"
)]
pub struct FieldTypeResponse {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    #[ts(type = "Record<string, unknown> | null")]
    pub validation_metadata: Option<Value>,
}

impl From<&FieldTypeDefinition> for FieldTypeResponse {
    fn from(value: &FieldTypeDefinition) -> Self {
        Self {
            id: value.id().as_i64(),
            name: value.name().as_str().to_owned(),
            code: value.code().as_str().to_owned(),
            description: value.description().map(str::to_owned),
            validation_metadata: value.validation_metadata().cloned(),
        }
    }
}

impl From<FieldTypeDefinition> for FieldTypeResponse {
    fn from(value: FieldTypeDefinition) -> Self {
        Self::from(&value)
    }
}
