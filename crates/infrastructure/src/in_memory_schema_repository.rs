use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use dynaform_application::{
    FIELD_TYPE_UNAVAILABLE_MESSAGE, FORM_UNAVAILABLE_MESSAGE, FieldDetail, FieldListFilter,
    FormListFilter, ListQuery, Page, SchemaRepository, SubmissionListFilter,
};
use dynaform_core::{AppError, AppResult, FieldErrors};
use dynaform_domain::{
    FieldDefinition, FieldDraft, FieldId, FieldTypeDefinition, FieldTypeDraft, FieldTypeId,
    FormDefinition, FormDraft, FormId, FormSchema, Submission, SubmissionDraft, SubmissionId,
};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct SchemaTables {
    last_form_id: i64,
    last_field_type_id: i64,
    last_field_id: i64,
    last_submission_id: i64,
    forms: BTreeMap<FormId, FormDefinition>,
    field_types: BTreeMap<FieldTypeId, FieldTypeDefinition>,
    fields: BTreeMap<FieldId, StoredField>,
    submissions: BTreeMap<SubmissionId, Submission>,
}

/// Field row as stored: the type is referenced by id and resolved on read
/// so field type updates are visible through every field.
#[derive(Debug, Clone)]
struct StoredField {
    field: FieldDefinition,
    field_type_id: FieldTypeId,
}

impl SchemaTables {
    fn resolve_field(&self, stored: &StoredField) -> AppResult<FieldDefinition> {
        let field_type = self
            .field_types
            .get(&stored.field_type_id)
            .cloned()
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "field '{}' references missing field type '{}'",
                    stored.field.id(),
                    stored.field_type_id
                ))
            })?;

        Ok(stored.field.clone().with_field_type(field_type))
    }

    fn schema(&self, form: &FormDefinition) -> AppResult<FormSchema> {
        let fields = self
            .fields
            .values()
            .filter(|stored| stored.field.form_id() == form.id())
            .map(|stored| self.resolve_field(stored))
            .collect::<AppResult<Vec<_>>>()?;

        FormSchema::new(form.clone(), fields)
    }

    fn detail(&self, stored: &StoredField) -> AppResult<FieldDetail> {
        let form = self
            .forms
            .get(&stored.field.form_id())
            .cloned()
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "field '{}' references missing form '{}'",
                    stored.field.id(),
                    stored.field.form_id()
                ))
            })?;

        Ok(FieldDetail {
            field: self.resolve_field(stored)?,
            form,
        })
    }

    fn name_taken(&self, form_id: FormId, name: &str, excluding: Option<FieldId>) -> bool {
        self.fields.values().any(|stored| {
            stored.field.form_id() == form_id
                && stored.field.name().as_str() == name
                && Some(stored.field.id()) != excluding
        })
    }

    fn check_field_references(&self, draft: &FieldDraft) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        if !self.forms.contains_key(&draft.form_id()) {
            errors.push("form_id", FORM_UNAVAILABLE_MESSAGE);
        }
        if !self.field_types.contains_key(&draft.field_type().id()) {
            errors.push("field_type_id", FIELD_TYPE_UNAVAILABLE_MESSAGE);
        }

        errors.into_result()
    }
}

/// In-memory schema repository implementation.
#[derive(Debug, Default)]
pub struct InMemorySchemaRepository {
    tables: RwLock<SchemaTables>,
}

impl InMemorySchemaRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T>(items: Vec<T>, query: ListQuery) -> Page<T> {
    Page {
        count: items.len() as u64,
        items: items
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect(),
    }
}

fn matches_search(form: &FormDefinition, search: &str) -> bool {
    let needle = search.to_lowercase();
    form.name().as_str().to_lowercase().contains(&needle)
        || form
            .description()
            .is_some_and(|description| description.to_lowercase().contains(&needle))
}

#[async_trait]
impl SchemaRepository for InMemorySchemaRepository {
    async fn create_form(&self, draft: FormDraft) -> AppResult<FormDefinition> {
        let mut tables = self.tables.write().await;
        tables.last_form_id += 1;
        let form_id = FormId::new(tables.last_form_id);

        let form = FormDefinition::from_draft(form_id, draft, Utc::now());
        tables.forms.insert(form_id, form.clone());
        Ok(form)
    }

    async fn update_form(&self, form_id: FormId, draft: FormDraft) -> AppResult<FormDefinition> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .forms
            .get_mut(&form_id)
            .ok_or_else(|| AppError::NotFound(format!("form '{form_id}' does not exist")))?;

        *stored = FormDefinition::from_draft(form_id, draft, stored.created_at());
        Ok(stored.clone())
    }

    async fn delete_form(&self, form_id: FormId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.forms.remove(&form_id).is_none() {
            return Err(AppError::NotFound(format!("form '{form_id}' does not exist")));
        }

        tables
            .fields
            .retain(|_, stored| stored.field.form_id() != form_id);
        Ok(())
    }

    async fn find_form(&self, form_id: FormId) -> AppResult<Option<FormDefinition>> {
        Ok(self.tables.read().await.forms.get(&form_id).cloned())
    }

    async fn find_form_schema(&self, form_id: FormId) -> AppResult<Option<FormSchema>> {
        let tables = self.tables.read().await;
        tables
            .forms
            .get(&form_id)
            .map(|form| tables.schema(form))
            .transpose()
    }

    async fn list_form_schemas(
        &self,
        filter: &FormListFilter,
        query: ListQuery,
    ) -> AppResult<Page<FormSchema>> {
        let tables = self.tables.read().await;
        let mut forms: Vec<&FormDefinition> = tables
            .forms
            .values()
            .filter(|form| {
                filter
                    .is_active
                    .is_none_or(|is_active| form.is_active() == is_active)
            })
            .filter(|form| {
                filter
                    .search
                    .as_deref()
                    .is_none_or(|search| matches_search(form, search))
            })
            .collect();
        forms.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| right.id().cmp(&left.id()))
        });

        let page = paginate(forms, query);
        let items = page
            .items
            .into_iter()
            .map(|form| tables.schema(form))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page {
            count: page.count,
            items,
        })
    }

    async fn create_field_type(&self, draft: FieldTypeDraft) -> AppResult<FieldTypeDefinition> {
        let mut tables = self.tables.write().await;
        tables.last_field_type_id += 1;
        let field_type_id = FieldTypeId::new(tables.last_field_type_id);

        let field_type = FieldTypeDefinition::from_draft(field_type_id, draft);
        tables.field_types.insert(field_type_id, field_type.clone());
        Ok(field_type)
    }

    async fn update_field_type(
        &self,
        field_type_id: FieldTypeId,
        draft: FieldTypeDraft,
    ) -> AppResult<FieldTypeDefinition> {
        let mut tables = self.tables.write().await;
        let stored = tables.field_types.get_mut(&field_type_id).ok_or_else(|| {
            AppError::NotFound(format!("field type '{field_type_id}' does not exist"))
        })?;

        *stored = FieldTypeDefinition::from_draft(field_type_id, draft);
        Ok(stored.clone())
    }

    async fn delete_field_type(&self, field_type_id: FieldTypeId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.field_types.contains_key(&field_type_id) {
            return Err(AppError::NotFound(format!(
                "field type '{field_type_id}' does not exist"
            )));
        }

        if tables
            .fields
            .values()
            .any(|stored| stored.field_type_id == field_type_id)
        {
            return Err(AppError::Conflict(format!(
                "field type '{field_type_id}' is still referenced by fields"
            )));
        }

        tables.field_types.remove(&field_type_id);
        Ok(())
    }

    async fn find_field_type(
        &self,
        field_type_id: FieldTypeId,
    ) -> AppResult<Option<FieldTypeDefinition>> {
        Ok(self
            .tables
            .read()
            .await
            .field_types
            .get(&field_type_id)
            .cloned())
    }

    async fn list_field_types(&self, query: ListQuery) -> AppResult<Page<FieldTypeDefinition>> {
        let tables = self.tables.read().await;
        let mut field_types: Vec<FieldTypeDefinition> =
            tables.field_types.values().cloned().collect();
        field_types.sort_by(|left, right| {
            left.name()
                .as_str()
                .cmp(right.name().as_str())
                .then_with(|| left.id().cmp(&right.id()))
        });

        Ok(paginate(field_types, query))
    }

    async fn field_name_taken(
        &self,
        form_id: FormId,
        name: &str,
        excluding: Option<FieldId>,
    ) -> AppResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .name_taken(form_id, name, excluding))
    }

    async fn create_field(&self, draft: FieldDraft) -> AppResult<FieldDefinition> {
        let mut tables = self.tables.write().await;
        tables.check_field_references(&draft)?;
        if tables.name_taken(draft.form_id(), draft.name().as_str(), None) {
            return Err(AppError::Conflict(format!(
                "field '{}' already exists in form '{}'",
                draft.name().as_str(),
                draft.form_id()
            )));
        }

        tables.last_field_id += 1;
        let field_id = FieldId::new(tables.last_field_id);
        let field_type_id = draft.field_type().id();
        let field = FieldDefinition::from_draft(field_id, draft);
        tables.fields.insert(
            field_id,
            StoredField {
                field: field.clone(),
                field_type_id,
            },
        );
        Ok(field)
    }

    async fn update_field(
        &self,
        field_id: FieldId,
        draft: FieldDraft,
    ) -> AppResult<FieldDefinition> {
        let mut tables = self.tables.write().await;
        if !tables.fields.contains_key(&field_id) {
            return Err(AppError::NotFound(format!(
                "field '{field_id}' does not exist"
            )));
        }
        tables.check_field_references(&draft)?;
        if tables.name_taken(draft.form_id(), draft.name().as_str(), Some(field_id)) {
            return Err(AppError::Conflict(format!(
                "field '{}' already exists in form '{}'",
                draft.name().as_str(),
                draft.form_id()
            )));
        }

        let field_type_id = draft.field_type().id();
        let field = FieldDefinition::from_draft(field_id, draft);
        tables.fields.insert(
            field_id,
            StoredField {
                field: field.clone(),
                field_type_id,
            },
        );
        Ok(field)
    }

    async fn delete_field(&self, field_id: FieldId) -> AppResult<()> {
        self.tables
            .write()
            .await
            .fields
            .remove(&field_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("field '{field_id}' does not exist")))
    }

    async fn find_field(&self, field_id: FieldId) -> AppResult<Option<FieldDetail>> {
        let tables = self.tables.read().await;
        tables
            .fields
            .get(&field_id)
            .map(|stored| tables.detail(stored))
            .transpose()
    }

    async fn list_fields(
        &self,
        filter: &FieldListFilter,
        query: ListQuery,
    ) -> AppResult<Page<FieldDetail>> {
        let tables = self.tables.read().await;
        let mut stored_fields: Vec<&StoredField> = tables
            .fields
            .values()
            .filter(|stored| {
                filter
                    .form_id
                    .is_none_or(|form_id| stored.field.form_id() == form_id)
            })
            .filter(|stored| {
                !filter.active_forms_only
                    || tables
                        .forms
                        .get(&stored.field.form_id())
                        .is_some_and(FormDefinition::is_active)
            })
            .collect();
        stored_fields.sort_by_key(|stored| (stored.field.form_id(), stored.field.id()));

        let page = paginate(stored_fields, query);
        let items = page
            .items
            .into_iter()
            .map(|stored| tables.detail(stored))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page {
            count: page.count,
            items,
        })
    }

    async fn create_submission(&self, draft: SubmissionDraft) -> AppResult<Submission> {
        let mut tables = self.tables.write().await;
        tables.last_submission_id += 1;
        let submission_id = SubmissionId::new(tables.last_submission_id);

        let submission = Submission::from_draft(submission_id, draft, Utc::now());
        tables.submissions.insert(submission_id, submission.clone());
        Ok(submission)
    }

    async fn find_submission(&self, submission_id: SubmissionId) -> AppResult<Option<Submission>> {
        Ok(self
            .tables
            .read()
            .await
            .submissions
            .get(&submission_id)
            .cloned())
    }

    async fn list_submissions(
        &self,
        filter: &SubmissionListFilter,
        query: ListQuery,
    ) -> AppResult<Page<Submission>> {
        let tables = self.tables.read().await;
        let mut submissions: Vec<Submission> = tables
            .submissions
            .values()
            .filter(|submission| {
                filter
                    .form_id
                    .is_none_or(|form_id| submission.form_id() == form_id)
            })
            .cloned()
            .collect();
        submissions.sort_by(|left, right| {
            right
                .submitted_at()
                .cmp(&left.submitted_at())
                .then_with(|| right.id().cmp(&left.id()))
        });

        Ok(paginate(submissions, query))
    }
}
