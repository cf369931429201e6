use std::sync::Arc;

use dynaform_core::{AppError, AppResult, FieldErrors, UserIdentity};
use dynaform_domain::{
    CrudAction, FieldDraft, FieldId, FieldTypeDefinition, FieldTypeId, FormDefinition, FormId,
    REQUIRED_MESSAGE, Resource, Surface,
};

use crate::AccessService;
use crate::schema_ports::{
    FIELD_TYPE_UNAVAILABLE_MESSAGE, FORM_UNAVAILABLE_MESSAGE, FieldDetail, FieldListFilter,
    ListQuery, Page, SchemaRepository,
};

const DUPLICATE_NAME_MESSAGE: &str = "A field with this name already exists in the specified form.";

/// Input payload for field creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateFieldInput {
    /// Owning form.
    pub form_id: Option<i64>,
    /// Field type reference.
    pub field_type_id: Option<i64>,
    /// Field name.
    pub name: Option<String>,
    /// Required flag, defaults to optional.
    pub is_required: Option<bool>,
    /// Choices for dropdown fields.
    pub choices: Option<Vec<String>>,
}

/// Partial field update. Omitted references keep the current form and type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFieldInput {
    /// Replacement owning form.
    pub form_id: Option<i64>,
    /// Replacement field type.
    pub field_type_id: Option<i64>,
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement required flag.
    pub is_required: Option<bool>,
    /// Replacement choices.
    pub choices: Option<Vec<String>>,
}

/// Application service for form fields.
#[derive(Clone)]
pub struct FieldService {
    repository: Arc<dyn SchemaRepository>,
    access_service: AccessService,
}

impl FieldService {
    /// Creates a new field service.
    #[must_use]
    pub fn new(repository: Arc<dyn SchemaRepository>, access_service: AccessService) -> Self {
        Self {
            repository,
            access_service,
        }
    }

    /// Lists fields with their owning forms. The public surface only sees
    /// fields of active forms.
    pub async fn list_fields(
        &self,
        actor: &UserIdentity,
        surface: Surface,
        form_id: Option<FormId>,
        query: ListQuery,
    ) -> AppResult<Page<FieldDetail>> {
        self.access_service
            .require_action(actor, surface, Resource::Field, CrudAction::List)
            .await?;

        let filter = FieldListFilter {
            form_id,
            active_forms_only: surface == Surface::Public,
        };
        self.repository.list_fields(&filter, query).await
    }

    /// Returns one field with its owning form.
    pub async fn get_field(
        &self,
        actor: &UserIdentity,
        surface: Surface,
        field_id: FieldId,
    ) -> AppResult<FieldDetail> {
        self.access_service
            .require_action(actor, surface, Resource::Field, CrudAction::Retrieve)
            .await?;

        self.repository
            .find_field(field_id)
            .await?
            .filter(|detail| surface == Surface::Admin || detail.form.is_active())
            .ok_or_else(|| field_not_found(field_id))
    }

    /// Creates a field on an active form.
    pub async fn create_field(
        &self,
        actor: &UserIdentity,
        input: CreateFieldInput,
    ) -> AppResult<FieldDetail> {
        self.access_service
            .require_action(actor, Surface::Admin, Resource::Field, CrudAction::Create)
            .await?;

        let mut errors = FieldErrors::new();
        let form = match input.form_id {
            Some(form_id) => self.resolve_active_form(form_id, &mut errors).await?,
            None => {
                errors.push("form_id", REQUIRED_MESSAGE);
                None
            }
        };
        let field_type = match input.field_type_id {
            Some(field_type_id) => self.resolve_field_type(field_type_id, &mut errors).await?,
            None => {
                errors.push("field_type_id", REQUIRED_MESSAGE);
                None
            }
        };
        if input.name.is_none() {
            errors.push("name", REQUIRED_MESSAGE);
        }
        errors.into_result()?;

        let (Some(form), Some(field_type), Some(name)) = (form, field_type, input.name) else {
            return Err(AppError::Internal(
                "field references resolved without errors but are missing".to_owned(),
            ));
        };

        let draft = FieldDraft::new(
            form.id(),
            field_type,
            name.trim(),
            input.is_required.unwrap_or(false),
            input.choices,
        )?;
        self.ensure_name_available(&draft, None).await?;

        let field = self
            .repository
            .create_field(draft)
            .await
            .map_err(duplicate_name_as_field_error)?;

        Ok(FieldDetail { field, form })
    }

    /// Applies a partial update to a field.
    pub async fn update_field(
        &self,
        actor: &UserIdentity,
        field_id: FieldId,
        input: UpdateFieldInput,
    ) -> AppResult<FieldDetail> {
        self.access_service
            .require_action(actor, Surface::Admin, Resource::Field, CrudAction::Update)
            .await?;

        let current = self
            .repository
            .find_field(field_id)
            .await?
            .ok_or_else(|| field_not_found(field_id))?;

        let mut errors = FieldErrors::new();
        let form = match input.form_id {
            Some(form_id) => self.resolve_active_form(form_id, &mut errors).await?,
            None => Some(current.form.clone()),
        };
        let field_type = match input.field_type_id {
            Some(field_type_id) => self.resolve_field_type(field_type_id, &mut errors).await?,
            None => Some(current.field.field_type().clone()),
        };
        errors.into_result()?;

        let (Some(form), Some(field_type)) = (form, field_type) else {
            return Err(AppError::Internal(
                "field references resolved without errors but are missing".to_owned(),
            ));
        };

        let choices = match input.choices {
            Some(choices) => Some(choices),
            None if field_type.code().uses_choices() => {
                current.field.choices().map(<[String]>::to_vec)
            }
            None => None,
        };
        let name = input
            .name
            .map(|name| name.trim().to_owned())
            .unwrap_or_else(|| current.field.name().as_str().to_owned());

        let draft = FieldDraft::new(
            form.id(),
            field_type,
            name,
            input.is_required.unwrap_or(current.field.is_required()),
            choices,
        )?;
        self.ensure_name_available(&draft, Some(field_id)).await?;

        let field = self
            .repository
            .update_field(field_id, draft)
            .await
            .map_err(duplicate_name_as_field_error)?;

        Ok(FieldDetail { field, form })
    }

    /// Deletes a field.
    pub async fn delete_field(&self, actor: &UserIdentity, field_id: FieldId) -> AppResult<()> {
        self.access_service
            .require_action(actor, Surface::Admin, Resource::Field, CrudAction::Delete)
            .await?;

        self.repository.delete_field(field_id).await
    }

    async fn resolve_active_form(
        &self,
        form_id: i64,
        errors: &mut FieldErrors,
    ) -> AppResult<Option<FormDefinition>> {
        let form = self
            .repository
            .find_form(FormId::new(form_id))
            .await?
            .filter(FormDefinition::is_active);
        if form.is_none() {
            errors.push("form_id", FORM_UNAVAILABLE_MESSAGE);
        }

        Ok(form)
    }

    async fn resolve_field_type(
        &self,
        field_type_id: i64,
        errors: &mut FieldErrors,
    ) -> AppResult<Option<FieldTypeDefinition>> {
        let field_type = self
            .repository
            .find_field_type(FieldTypeId::new(field_type_id))
            .await?;
        if field_type.is_none() {
            errors.push("field_type_id", FIELD_TYPE_UNAVAILABLE_MESSAGE);
        }

        Ok(field_type)
    }

    async fn ensure_name_available(
        &self,
        draft: &FieldDraft,
        excluding: Option<FieldId>,
    ) -> AppResult<()> {
        if self
            .repository
            .field_name_taken(draft.form_id(), draft.name().as_str(), excluding)
            .await?
        {
            return Err(AppError::field("name", DUPLICATE_NAME_MESSAGE));
        }

        Ok(())
    }
}

fn duplicate_name_as_field_error(error: AppError) -> AppError {
    match error {
        AppError::Conflict(_) => AppError::field("name", DUPLICATE_NAME_MESSAGE),
        other => other,
    }
}

fn field_not_found(field_id: FieldId) -> AppError {
    AppError::NotFound(format!("field '{field_id}' does not exist"))
}
