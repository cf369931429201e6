use std::str::FromStr;
use std::sync::Arc;

use dynaform_core::{AppError, AppResult, FieldErrors, UserIdentity};
use dynaform_domain::{
    CrudAction, FieldTypeCode, FieldTypeDefinition, FieldTypeDraft, FieldTypeId, REQUIRED_MESSAGE,
    Resource, Surface,
};
use serde_json::Value;

use crate::AccessService;
use crate::schema_ports::{ListQuery, Page, SchemaRepository};

/// Input payload for field type creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFieldTypeInput {
    /// Display name, required.
    pub name: Option<String>,
    /// Type code as sent by the client, required.
    pub code: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Optional metadata object.
    pub validation_metadata: Option<Value>,
}

/// Partial field type update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFieldTypeInput {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement type code.
    pub code: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement metadata object.
    pub validation_metadata: Option<Value>,
}

/// Application service for field type records.
#[derive(Clone)]
pub struct FieldTypeService {
    repository: Arc<dyn SchemaRepository>,
    access_service: AccessService,
}

impl FieldTypeService {
    /// Creates a new field type service.
    #[must_use]
    pub fn new(repository: Arc<dyn SchemaRepository>, access_service: AccessService) -> Self {
        Self {
            repository,
            access_service,
        }
    }

    /// Lists field types ordered by name.
    pub async fn list_field_types(
        &self,
        actor: &UserIdentity,
        surface: Surface,
        query: ListQuery,
    ) -> AppResult<Page<FieldTypeDefinition>> {
        self.access_service
            .require_action(actor, surface, Resource::FieldType, CrudAction::List)
            .await?;

        self.repository.list_field_types(query).await
    }

    /// Returns one field type.
    pub async fn get_field_type(
        &self,
        actor: &UserIdentity,
        surface: Surface,
        field_type_id: FieldTypeId,
    ) -> AppResult<FieldTypeDefinition> {
        self.access_service
            .require_action(actor, surface, Resource::FieldType, CrudAction::Retrieve)
            .await?;

        self.repository
            .find_field_type(field_type_id)
            .await?
            .ok_or_else(|| field_type_not_found(field_type_id))
    }

    /// Creates a field type.
    pub async fn create_field_type(
        &self,
        actor: &UserIdentity,
        input: CreateFieldTypeInput,
    ) -> AppResult<FieldTypeDefinition> {
        self.access_service
            .require_action(
                actor,
                Surface::Admin,
                Resource::FieldType,
                CrudAction::Create,
            )
            .await?;

        let mut errors = FieldErrors::new();
        if input.name.is_none() {
            errors.push("name", REQUIRED_MESSAGE);
        }
        if input.code.is_none() {
            errors.push("code", REQUIRED_MESSAGE);
        }
        errors.into_result()?;

        let (Some(name), Some(code)) = (input.name, input.code) else {
            return Err(AppError::Internal(
                "field type input checked without errors but is incomplete".to_owned(),
            ));
        };

        let draft = FieldTypeDraft::new(
            name,
            FieldTypeCode::from_str(code.trim())?,
            input.description,
            input.validation_metadata,
        )?;

        self.repository.create_field_type(draft).await
    }

    /// Applies a partial update to a field type. Fields referencing it keep
    /// their stored choices.
    pub async fn update_field_type(
        &self,
        actor: &UserIdentity,
        field_type_id: FieldTypeId,
        input: UpdateFieldTypeInput,
    ) -> AppResult<FieldTypeDefinition> {
        self.access_service
            .require_action(
                actor,
                Surface::Admin,
                Resource::FieldType,
                CrudAction::Update,
            )
            .await?;

        let current = self
            .repository
            .find_field_type(field_type_id)
            .await?
            .ok_or_else(|| field_type_not_found(field_type_id))?
            .to_draft();

        let code = match input.code {
            Some(code) => FieldTypeCode::from_str(code.trim())?,
            None => current.code(),
        };
        let draft = FieldTypeDraft::new(
            input
                .name
                .unwrap_or_else(|| current.name().as_str().to_owned()),
            code,
            input
                .description
                .or_else(|| current.description().map(str::to_owned)),
            input
                .validation_metadata
                .or_else(|| current.validation_metadata().cloned()),
        )?;

        self.repository.update_field_type(field_type_id, draft).await
    }

    /// Deletes a field type that no field references.
    pub async fn delete_field_type(
        &self,
        actor: &UserIdentity,
        field_type_id: FieldTypeId,
    ) -> AppResult<()> {
        self.access_service
            .require_action(
                actor,
                Surface::Admin,
                Resource::FieldType,
                CrudAction::Delete,
            )
            .await?;

        self.repository.delete_field_type(field_type_id).await
    }
}

fn field_type_not_found(field_type_id: FieldTypeId) -> AppError {
    AppError::NotFound(format!("field type '{field_type_id}' does not exist"))
}
