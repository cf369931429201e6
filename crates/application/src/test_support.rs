use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use dynaform_core::{AppError, AppResult, UserIdentity};
use dynaform_domain::{
    FieldDefinition, FieldDraft, FieldId, FieldTypeDefinition, FieldTypeDraft, FieldTypeId,
    FormDefinition, FormDraft, FormId, FormSchema, Permission, Submission, SubmissionDraft,
    SubmissionId,
};
use tokio::sync::Mutex;

use crate::access_ports::AuthorizationRepository;
use crate::endpoint_policy::EndpointPolicies;
use crate::schema_ports::{
    FieldDetail, FieldListFilter, FormListFilter, ListQuery, Page, SchemaRepository,
    SubmissionListFilter,
};
use crate::AccessService;

#[derive(Default)]
struct FakeState {
    next_id: i64,
    forms: BTreeMap<i64, FormDefinition>,
    field_types: BTreeMap<i64, FieldTypeDefinition>,
    fields: BTreeMap<i64, FieldDefinition>,
    submissions: BTreeMap<i64, Submission>,
}

impl FakeState {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn schema(&self, form: &FormDefinition) -> AppResult<FormSchema> {
        let fields = self
            .fields
            .values()
            .filter(|field| field.form_id() == form.id())
            .cloned()
            .collect();
        FormSchema::new(form.clone(), fields)
    }

    fn detail(&self, field: &FieldDefinition) -> AppResult<FieldDetail> {
        let form = self
            .forms
            .get(&field.form_id().as_i64())
            .cloned()
            .ok_or_else(|| AppError::Internal("field without form".to_owned()))?;
        Ok(FieldDetail {
            field: field.clone(),
            form,
        })
    }

    fn name_taken(&self, form_id: FormId, name: &str, excluding: Option<FieldId>) -> bool {
        self.fields.values().any(|field| {
            field.form_id() == form_id
                && field.name().as_str() == name
                && Some(field.id()) != excluding
        })
    }
}

fn page<T>(items: Vec<T>, query: ListQuery) -> Page<T> {
    let count = items.len() as u64;
    Page {
        count,
        items: items
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect(),
    }
}

/// Minimal schema store used by service tests.
#[derive(Default)]
pub(crate) struct FakeSchemaRepository {
    state: Mutex<FakeState>,
    stale_name_checks: bool,
}

impl FakeSchemaRepository {
    /// Store whose name pre-check never sees existing fields, as when a
    /// concurrent writer commits between the check and the insert. Only the
    /// write itself reports the duplicate.
    pub(crate) fn with_stale_name_checks() -> Self {
        Self {
            stale_name_checks: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl SchemaRepository for FakeSchemaRepository {
    async fn create_form(&self, draft: FormDraft) -> AppResult<FormDefinition> {
        let mut state = self.state.lock().await;
        let id = state.allocate();
        let created_at = Utc
            .timestamp_opt(1_700_000_000 + id, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let form = FormDefinition::from_draft(FormId::new(id), draft, created_at);
        state.forms.insert(id, form.clone());
        Ok(form)
    }

    async fn update_form(&self, form_id: FormId, draft: FormDraft) -> AppResult<FormDefinition> {
        let mut state = self.state.lock().await;
        let existing = state
            .forms
            .get(&form_id.as_i64())
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("form '{form_id}' does not exist")))?;
        let form = FormDefinition::from_draft(form_id, draft, existing.created_at());
        state.forms.insert(form_id.as_i64(), form.clone());
        Ok(form)
    }

    async fn delete_form(&self, form_id: FormId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.forms.remove(&form_id.as_i64()).is_none() {
            return Err(AppError::NotFound(format!("form '{form_id}' does not exist")));
        }
        state.fields.retain(|_, field| field.form_id() != form_id);
        Ok(())
    }

    async fn find_form(&self, form_id: FormId) -> AppResult<Option<FormDefinition>> {
        Ok(self.state.lock().await.forms.get(&form_id.as_i64()).cloned())
    }

    async fn find_form_schema(&self, form_id: FormId) -> AppResult<Option<FormSchema>> {
        let state = self.state.lock().await;
        state
            .forms
            .get(&form_id.as_i64())
            .map(|form| state.schema(form))
            .transpose()
    }

    async fn list_form_schemas(
        &self,
        filter: &FormListFilter,
        query: ListQuery,
    ) -> AppResult<Page<FormSchema>> {
        let state = self.state.lock().await;
        let schemas = state
            .forms
            .values()
            .rev()
            .filter(|form| filter.is_active.is_none_or(|active| form.is_active() == active))
            .map(|form| state.schema(form))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(page(schemas, query))
    }

    async fn create_field_type(&self, draft: FieldTypeDraft) -> AppResult<FieldTypeDefinition> {
        let mut state = self.state.lock().await;
        let id = state.allocate();
        let field_type = FieldTypeDefinition::from_draft(FieldTypeId::new(id), draft);
        state.field_types.insert(id, field_type.clone());
        Ok(field_type)
    }

    async fn update_field_type(
        &self,
        field_type_id: FieldTypeId,
        draft: FieldTypeDraft,
    ) -> AppResult<FieldTypeDefinition> {
        let mut state = self.state.lock().await;
        if !state.field_types.contains_key(&field_type_id.as_i64()) {
            return Err(AppError::NotFound(format!(
                "field type '{field_type_id}' does not exist"
            )));
        }
        let field_type = FieldTypeDefinition::from_draft(field_type_id, draft);
        state
            .field_types
            .insert(field_type_id.as_i64(), field_type.clone());
        Ok(field_type)
    }

    async fn delete_field_type(&self, field_type_id: FieldTypeId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state
            .fields
            .values()
            .any(|field| field.field_type().id() == field_type_id)
        {
            return Err(AppError::Conflict(format!(
                "field type '{field_type_id}' is referenced by fields"
            )));
        }
        state
            .field_types
            .remove(&field_type_id.as_i64())
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("field type '{field_type_id}' does not exist")))
    }

    async fn find_field_type(
        &self,
        field_type_id: FieldTypeId,
    ) -> AppResult<Option<FieldTypeDefinition>> {
        Ok(self
            .state
            .lock()
            .await
            .field_types
            .get(&field_type_id.as_i64())
            .cloned())
    }

    async fn list_field_types(&self, query: ListQuery) -> AppResult<Page<FieldTypeDefinition>> {
        let state = self.state.lock().await;
        let mut field_types: Vec<_> = state.field_types.values().cloned().collect();
        field_types.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(page(field_types, query))
    }

    async fn field_name_taken(
        &self,
        form_id: FormId,
        name: &str,
        excluding: Option<FieldId>,
    ) -> AppResult<bool> {
        if self.stale_name_checks {
            return Ok(false);
        }

        Ok(self
            .state
            .lock()
            .await
            .name_taken(form_id, name, excluding))
    }

    async fn create_field(&self, draft: FieldDraft) -> AppResult<FieldDefinition> {
        let mut state = self.state.lock().await;
        if state.name_taken(draft.form_id(), draft.name().as_str(), None) {
            return Err(AppError::Conflict("duplicate field name".to_owned()));
        }
        let id = state.allocate();
        let field = FieldDefinition::from_draft(FieldId::new(id), draft);
        state.fields.insert(id, field.clone());
        Ok(field)
    }

    async fn update_field(&self, field_id: FieldId, draft: FieldDraft) -> AppResult<FieldDefinition> {
        let mut state = self.state.lock().await;
        if !state.fields.contains_key(&field_id.as_i64()) {
            return Err(AppError::NotFound(format!("field '{field_id}' does not exist")));
        }
        if state.name_taken(draft.form_id(), draft.name().as_str(), Some(field_id)) {
            return Err(AppError::Conflict("duplicate field name".to_owned()));
        }
        let field = FieldDefinition::from_draft(field_id, draft);
        state.fields.insert(field_id.as_i64(), field.clone());
        Ok(field)
    }

    async fn delete_field(&self, field_id: FieldId) -> AppResult<()> {
        self.state
            .lock()
            .await
            .fields
            .remove(&field_id.as_i64())
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("field '{field_id}' does not exist")))
    }

    async fn find_field(&self, field_id: FieldId) -> AppResult<Option<FieldDetail>> {
        let state = self.state.lock().await;
        state
            .fields
            .get(&field_id.as_i64())
            .map(|field| state.detail(field))
            .transpose()
    }

    async fn list_fields(
        &self,
        filter: &FieldListFilter,
        query: ListQuery,
    ) -> AppResult<Page<FieldDetail>> {
        let state = self.state.lock().await;
        let details = state
            .fields
            .values()
            .filter(|field| filter.form_id.is_none_or(|form_id| field.form_id() == form_id))
            .map(|field| state.detail(field))
            .collect::<AppResult<Vec<_>>>()?
            .into_iter()
            .filter(|detail| !filter.active_forms_only || detail.form.is_active())
            .collect();
        Ok(page(details, query))
    }

    async fn create_submission(&self, draft: SubmissionDraft) -> AppResult<Submission> {
        let mut state = self.state.lock().await;
        let id = state.allocate();
        let submission = Submission::from_draft(SubmissionId::new(id), draft, Utc::now());
        state.submissions.insert(id, submission.clone());
        Ok(submission)
    }

    async fn find_submission(&self, submission_id: SubmissionId) -> AppResult<Option<Submission>> {
        Ok(self
            .state
            .lock()
            .await
            .submissions
            .get(&submission_id.as_i64())
            .cloned())
    }

    async fn list_submissions(
        &self,
        filter: &SubmissionListFilter,
        query: ListQuery,
    ) -> AppResult<Page<Submission>> {
        let state = self.state.lock().await;
        let submissions = state
            .submissions
            .values()
            .rev()
            .filter(|submission| {
                filter
                    .form_id
                    .is_none_or(|form_id| submission.form_id() == form_id)
            })
            .cloned()
            .collect();
        Ok(page(submissions, query))
    }
}

/// Permission grants keyed by subject.
#[derive(Default)]
pub(crate) struct FakeAuthorizationRepository {
    pub(crate) grants: HashMap<String, Vec<Permission>>,
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn list_permissions_for_subject(&self, subject: &str) -> AppResult<Vec<Permission>> {
        Ok(self.grants.get(subject).cloned().unwrap_or_default())
    }
}

pub(crate) fn admin() -> UserIdentity {
    UserIdentity::new("alice", "Alice", true)
}

pub(crate) fn member() -> UserIdentity {
    UserIdentity::new("bob", "Bob", false)
}

pub(crate) fn access_service(policies: EndpointPolicies) -> AccessService {
    AccessService::new(
        Arc::new(policies),
        Arc::new(FakeAuthorizationRepository::default()),
    )
}
