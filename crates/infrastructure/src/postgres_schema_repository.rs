use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dynaform_application::{
    FIELD_TYPE_UNAVAILABLE_MESSAGE, FORM_UNAVAILABLE_MESSAGE, FieldDetail, FieldListFilter,
    FormListFilter, ListQuery, Page, SchemaRepository, SubmissionListFilter,
};
use dynaform_core::{AppError, AppResult};
use dynaform_domain::{
    FieldDefinition, FieldDraft, FieldId, FieldTypeCode, FieldTypeDefinition, FieldTypeDraft,
    FieldTypeId, FormDefinition, FormDraft, FormId, FormSchema, Submission, SubmissionDraft,
    SubmissionId,
};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::warn;

mod field_types;
mod fields;
mod forms;
mod submissions;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const FIELD_FORM_FOREIGN_KEY: &str = "fields_form_id_fkey";

/// Column list shared by every query that returns a field with its type.
const FIELD_COLUMNS: &str = r#"
    fields.id,
    fields.form_id,
    fields.name,
    fields.is_required,
    fields.choices,
    field_types.id AS field_type_id,
    field_types.name AS field_type_name,
    field_types.code AS field_type_code,
    field_types.description AS field_type_description,
    field_types.validation_metadata AS field_type_validation_metadata
"#;

/// PostgreSQL-backed repository for forms, fields, field types and
/// submissions.
#[derive(Clone)]
pub struct PostgresSchemaRepository {
    pool: PgPool,
}

impl PostgresSchemaRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct FormRow {
    id: i64,
    name: String,
    description: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl FormRow {
    fn into_definition(self) -> AppResult<FormDefinition> {
        let draft = FormDraft::new(self.name, self.description, self.is_active).map_err(|error| {
            AppError::Internal(format!("persisted form '{}' is invalid: {error}", self.id))
        })?;

        Ok(FormDefinition::from_draft(
            FormId::new(self.id),
            draft,
            self.created_at,
        ))
    }
}

#[derive(Debug, FromRow)]
struct FieldTypeRow {
    id: i64,
    name: String,
    code: String,
    description: Option<String>,
    validation_metadata: Option<Value>,
}

impl FieldTypeRow {
    fn into_definition(self) -> AppResult<FieldTypeDefinition> {
        let code = FieldTypeCode::from_str(self.code.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "persisted field type '{}' has invalid code '{}': {error}",
                self.id, self.code
            ))
        })?;
        let draft = FieldTypeDraft::new(self.name, code, self.description, self.validation_metadata)
            .map_err(|error| {
                AppError::Internal(format!(
                    "persisted field type '{}' is invalid: {error}",
                    self.id
                ))
            })?;

        Ok(FieldTypeDefinition::from_draft(
            FieldTypeId::new(self.id),
            draft,
        ))
    }
}

#[derive(Debug, FromRow)]
struct FieldRow {
    id: i64,
    form_id: i64,
    name: String,
    is_required: bool,
    choices: Option<Value>,
    field_type_id: i64,
    field_type_name: String,
    field_type_code: String,
    field_type_description: Option<String>,
    field_type_validation_metadata: Option<Value>,
}

impl FieldRow {
    fn into_definition(self) -> AppResult<FieldDefinition> {
        let field_type = FieldTypeRow {
            id: self.field_type_id,
            name: self.field_type_name,
            code: self.field_type_code,
            description: self.field_type_description,
            validation_metadata: self.field_type_validation_metadata,
        }
        .into_definition()?;

        let choices = self
            .choices
            .map(serde_json::from_value::<Vec<String>>)
            .transpose()
            .map_err(|error| {
                AppError::Internal(format!(
                    "persisted choices for field '{}' are invalid: {error}",
                    self.id
                ))
            })?;

        FieldDefinition::restore(
            FieldId::new(self.id),
            FormId::new(self.form_id),
            field_type,
            self.name,
            self.is_required,
            choices,
        )
        .map_err(|error| {
            AppError::Internal(format!("persisted field '{}' is invalid: {error}", self.id))
        })
    }
}

#[derive(Debug, FromRow)]
struct FieldDetailRow {
    #[sqlx(flatten)]
    field: FieldRow,
    form_name: String,
    form_description: Option<String>,
    form_is_active: bool,
    form_created_at: DateTime<Utc>,
}

impl FieldDetailRow {
    fn into_detail(self) -> AppResult<FieldDetail> {
        let form = FormRow {
            id: self.field.form_id,
            name: self.form_name,
            description: self.form_description,
            is_active: self.form_is_active,
            created_at: self.form_created_at,
        }
        .into_definition()?;

        Ok(FieldDetail {
            field: self.field.into_definition()?,
            form,
        })
    }
}

#[derive(Debug, FromRow)]
struct SubmissionRow {
    id: i64,
    form_id: i64,
    form_name: String,
    submitted_data: Value,
    submitted_at: DateTime<Utc>,
}

impl SubmissionRow {
    fn into_submission(self) -> AppResult<Submission> {
        let id = self.id;
        Submission::new(
            SubmissionId::new(self.id),
            FormId::new(self.form_id),
            self.form_name,
            self.submitted_data,
            self.submitted_at,
        )
        .map_err(|error| {
            AppError::Internal(format!("persisted submission '{id}' is invalid: {error}"))
        })
    }
}

#[derive(Debug, FromRow)]
struct CountRow {
    count: i64,
}

fn database_error_code(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(database_error) => {
            database_error.code().map(|code| code.into_owned())
        }
        _ => None,
    }
}

fn database_error_constraint(error: &sqlx::Error) -> Option<&str> {
    match error {
        sqlx::Error::Database(database_error) => database_error.constraint(),
        _ => None,
    }
}

fn page_bounds(query: ListQuery) -> (i64, i64) {
    (
        i64::try_from(query.limit).unwrap_or(i64::MAX),
        i64::try_from(query.offset).unwrap_or(i64::MAX),
    )
}

fn page_count(row: CountRow) -> u64 {
    u64::try_from(row.count).unwrap_or_default()
}

/// Escapes `LIKE` wildcards so user search text matches literally.
fn contains_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl SchemaRepository for PostgresSchemaRepository {
    async fn create_form(&self, draft: FormDraft) -> AppResult<FormDefinition> {
        self.create_form_impl(draft).await
    }

    async fn update_form(&self, form_id: FormId, draft: FormDraft) -> AppResult<FormDefinition> {
        self.update_form_impl(form_id, draft).await
    }

    async fn delete_form(&self, form_id: FormId) -> AppResult<()> {
        self.delete_form_impl(form_id).await
    }

    async fn find_form(&self, form_id: FormId) -> AppResult<Option<FormDefinition>> {
        self.find_form_impl(form_id).await
    }

    async fn find_form_schema(&self, form_id: FormId) -> AppResult<Option<FormSchema>> {
        self.find_form_schema_impl(form_id).await
    }

    async fn list_form_schemas(
        &self,
        filter: &FormListFilter,
        query: ListQuery,
    ) -> AppResult<Page<FormSchema>> {
        self.list_form_schemas_impl(filter, query).await
    }

    async fn create_field_type(&self, draft: FieldTypeDraft) -> AppResult<FieldTypeDefinition> {
        self.create_field_type_impl(draft).await
    }

    async fn update_field_type(
        &self,
        field_type_id: FieldTypeId,
        draft: FieldTypeDraft,
    ) -> AppResult<FieldTypeDefinition> {
        self.update_field_type_impl(field_type_id, draft).await
    }

    async fn delete_field_type(&self, field_type_id: FieldTypeId) -> AppResult<()> {
        self.delete_field_type_impl(field_type_id).await
    }

    async fn find_field_type(
        &self,
        field_type_id: FieldTypeId,
    ) -> AppResult<Option<FieldTypeDefinition>> {
        self.find_field_type_impl(field_type_id).await
    }

    async fn list_field_types(&self, query: ListQuery) -> AppResult<Page<FieldTypeDefinition>> {
        self.list_field_types_impl(query).await
    }

    async fn field_name_taken(
        &self,
        form_id: FormId,
        name: &str,
        excluding: Option<FieldId>,
    ) -> AppResult<bool> {
        self.field_name_taken_impl(form_id, name, excluding).await
    }

    async fn create_field(&self, draft: FieldDraft) -> AppResult<FieldDefinition> {
        self.create_field_impl(draft).await
    }

    async fn update_field(
        &self,
        field_id: FieldId,
        draft: FieldDraft,
    ) -> AppResult<FieldDefinition> {
        self.update_field_impl(field_id, draft).await
    }

    async fn delete_field(&self, field_id: FieldId) -> AppResult<()> {
        self.delete_field_impl(field_id).await
    }

    async fn find_field(&self, field_id: FieldId) -> AppResult<Option<FieldDetail>> {
        self.find_field_impl(field_id).await
    }

    async fn list_fields(
        &self,
        filter: &FieldListFilter,
        query: ListQuery,
    ) -> AppResult<Page<FieldDetail>> {
        self.list_fields_impl(filter, query).await
    }

    async fn create_submission(&self, draft: SubmissionDraft) -> AppResult<Submission> {
        self.create_submission_impl(draft).await
    }

    async fn find_submission(&self, submission_id: SubmissionId) -> AppResult<Option<Submission>> {
        self.find_submission_impl(submission_id).await
    }

    async fn list_submissions(
        &self,
        filter: &SubmissionListFilter,
        query: ListQuery,
    ) -> AppResult<Page<Submission>> {
        self.list_submissions_impl(filter, query).await
    }
}
