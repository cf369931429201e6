use std::sync::Arc;

use dynaform_core::{AppError, AppResult, UserIdentity};
use dynaform_domain::{
    CrudAction, FormDraft, FormId, FormSchema, REQUIRED_MESSAGE, Resource, Surface,
};

use crate::AccessService;
use crate::schema_ports::{FormListFilter, ListQuery, Page, SchemaRepository};

/// Input payload for form creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFormInput {
    /// Form name, required.
    pub name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Active flag, defaults to active.
    pub is_active: Option<bool>,
}

/// Partial form update. Omitted attributes keep their current value; a
/// blank description clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFormInput {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement active flag.
    pub is_active: Option<bool>,
}

/// Application service for form definitions.
#[derive(Clone)]
pub struct FormService {
    repository: Arc<dyn SchemaRepository>,
    access_service: AccessService,
}

impl FormService {
    /// Creates a new form service.
    #[must_use]
    pub fn new(repository: Arc<dyn SchemaRepository>, access_service: AccessService) -> Self {
        Self {
            repository,
            access_service,
        }
    }

    /// Lists forms with their fields. The public surface only sees active
    /// forms regardless of the requested filter.
    pub async fn list_forms(
        &self,
        actor: &UserIdentity,
        surface: Surface,
        mut filter: FormListFilter,
        query: ListQuery,
    ) -> AppResult<Page<FormSchema>> {
        self.access_service
            .require_action(actor, surface, Resource::Form, CrudAction::List)
            .await?;

        if surface == Surface::Public {
            filter.is_active = Some(true);
        }
        filter.search = filter
            .search
            .map(|search| search.trim().to_owned())
            .filter(|search| !search.is_empty());

        self.repository.list_form_schemas(&filter, query).await
    }

    /// Returns one form with its ordered fields.
    pub async fn get_form(
        &self,
        actor: &UserIdentity,
        surface: Surface,
        form_id: FormId,
    ) -> AppResult<FormSchema> {
        self.access_service
            .require_action(actor, surface, Resource::Form, CrudAction::Retrieve)
            .await?;

        self.repository
            .find_form_schema(form_id)
            .await?
            .filter(|schema| surface == Surface::Admin || schema.form().is_active())
            .ok_or_else(|| form_not_found(form_id))
    }

    /// Creates a form.
    pub async fn create_form(
        &self,
        actor: &UserIdentity,
        input: CreateFormInput,
    ) -> AppResult<FormSchema> {
        self.access_service
            .require_action(actor, Surface::Admin, Resource::Form, CrudAction::Create)
            .await?;

        let name = input
            .name
            .ok_or_else(|| AppError::field("name", REQUIRED_MESSAGE))?;
        let draft = FormDraft::new(name, input.description, input.is_active.unwrap_or(true))?;
        let form = self.repository.create_form(draft).await?;

        FormSchema::new(form, Vec::new())
    }

    /// Applies a partial update to a form.
    pub async fn update_form(
        &self,
        actor: &UserIdentity,
        form_id: FormId,
        input: UpdateFormInput,
    ) -> AppResult<FormSchema> {
        self.access_service
            .require_action(actor, Surface::Admin, Resource::Form, CrudAction::Update)
            .await?;

        let current = self
            .repository
            .find_form(form_id)
            .await?
            .ok_or_else(|| form_not_found(form_id))?
            .to_draft();

        let draft = FormDraft::new(
            input
                .name
                .unwrap_or_else(|| current.name().as_str().to_owned()),
            input
                .description
                .or_else(|| current.description().map(str::to_owned)),
            input.is_active.unwrap_or(current.is_active()),
        )?;
        self.repository.update_form(form_id, draft).await?;

        self.repository
            .find_form_schema(form_id)
            .await?
            .ok_or_else(|| form_not_found(form_id))
    }

    /// Deletes a form and its fields. Submissions are kept.
    pub async fn delete_form(&self, actor: &UserIdentity, form_id: FormId) -> AppResult<()> {
        self.access_service
            .require_action(actor, Surface::Admin, Resource::Form, CrudAction::Delete)
            .await?;

        self.repository.delete_form(form_id).await
    }
}

fn form_not_found(form_id: FormId) -> AppError {
    AppError::NotFound(format!("form '{form_id}' does not exist"))
}
