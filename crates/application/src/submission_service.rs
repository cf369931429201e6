use std::sync::Arc;

use dynaform_core::{AppError, AppResult, FieldErrors, UserIdentity};
use dynaform_domain::{
    CrudAction, FormId, REQUIRED_MESSAGE, Resource, SUBMITTED_DATA_KEY, Submission, SubmissionId,
    Surface,
};
use serde_json::Value;

use crate::AccessService;
use crate::schema_ports::{ListQuery, Page, SchemaRepository, SubmissionListFilter};

const FORM_KEY: &str = "form";

/// Input payload for a public submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateSubmissionInput {
    /// Target form.
    pub form: Option<i64>,
    /// Candidate payload.
    pub submitted_data: Option<Value>,
}

/// Application service accepting and reading form submissions.
#[derive(Clone)]
pub struct SubmissionService {
    repository: Arc<dyn SchemaRepository>,
    access_service: AccessService,
}

impl SubmissionService {
    /// Creates a new submission service.
    #[must_use]
    pub fn new(repository: Arc<dyn SchemaRepository>, access_service: AccessService) -> Self {
        Self {
            repository,
            access_service,
        }
    }

    /// Validates a payload against the form's current fields and stores it.
    ///
    /// Nothing is written when validation fails.
    pub async fn submit(
        &self,
        actor: &UserIdentity,
        input: CreateSubmissionInput,
    ) -> AppResult<Submission> {
        self.access_service
            .require_action(
                actor,
                Surface::Public,
                Resource::Submission,
                CrudAction::Create,
            )
            .await?;

        let mut errors = FieldErrors::new();
        if input.form.is_none() {
            errors.push(FORM_KEY, REQUIRED_MESSAGE);
        }
        if input.submitted_data.is_none() {
            errors.push(SUBMITTED_DATA_KEY, REQUIRED_MESSAGE);
        }
        errors.into_result()?;

        let (Some(form_id), Some(payload)) = (input.form, input.submitted_data) else {
            return Err(AppError::Internal(
                "submission input checked without errors but is incomplete".to_owned(),
            ));
        };

        let form_id = FormId::new(form_id);
        let schema = self
            .repository
            .find_form_schema(form_id)
            .await?
            .filter(|schema| schema.form().is_active())
            .ok_or_else(|| {
                AppError::field(
                    FORM_KEY,
                    format!("Invalid pk \"{form_id}\" - object does not exist."),
                )
            })?;

        let draft = schema.validate_submission(payload)?;
        self.repository.create_submission(draft).await
    }

    /// Lists submissions, newest first.
    pub async fn list_submissions(
        &self,
        actor: &UserIdentity,
        form_id: Option<FormId>,
        query: ListQuery,
    ) -> AppResult<Page<Submission>> {
        self.access_service
            .require_action(actor, Surface::Admin, Resource::Submission, CrudAction::List)
            .await?;

        self.repository
            .list_submissions(&SubmissionListFilter { form_id }, query)
            .await
    }

    /// Returns one submission.
    pub async fn get_submission(
        &self,
        actor: &UserIdentity,
        submission_id: SubmissionId,
    ) -> AppResult<Submission> {
        self.access_service
            .require_action(
                actor,
                Surface::Admin,
                Resource::Submission,
                CrudAction::Retrieve,
            )
            .await?;

        self.repository
            .find_submission(submission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("submission '{submission_id}' does not exist"))
            })
    }
}

#[cfg(test)]
mod tests;
