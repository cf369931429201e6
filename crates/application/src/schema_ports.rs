use async_trait::async_trait;
use dynaform_core::AppResult;
use dynaform_domain::{
    FieldDefinition, FieldDraft, FieldId, FieldTypeDefinition, FieldTypeDraft, FieldTypeId,
    FormDefinition, FormDraft, FormId, FormSchema, Submission, SubmissionDraft, SubmissionId,
};

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: usize = 200;

/// Reported under `form_id` when a field's form is missing or inactive.
pub const FORM_UNAVAILABLE_MESSAGE: &str = "Form with the given ID was not found or is inactive.";

/// Reported under `field_type_id` when a field's type is missing.
pub const FIELD_TYPE_UNAVAILABLE_MESSAGE: &str = "Field Type with the given ID was not found.";

/// Offset pagination inputs for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped.
    pub offset: usize,
}

impl ListQuery {
    /// Builds a query from optional transport values, clamping the limit.
    #[must_use]
    pub fn new(limit: Option<usize>, offset: Option<usize>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total row count for the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Rows matching the filter before pagination.
    pub count: u64,
    /// Rows in this page.
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Converts every item, keeping the count.
    pub fn map<U>(self, convert: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            items: self.items.into_iter().map(convert).collect(),
        }
    }
}

/// Filters for form listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormListFilter {
    /// Case-insensitive substring matched against name and description.
    pub search: Option<String>,
    /// Restricts results to active or inactive forms.
    pub is_active: Option<bool>,
}

/// Filters for field listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldListFilter {
    /// Restricts results to one form.
    pub form_id: Option<FormId>,
    /// Hides fields whose form is inactive.
    pub active_forms_only: bool,
}

/// Filters for submission listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionListFilter {
    /// Restricts results to one form.
    pub form_id: Option<FormId>,
}

/// Field together with the form that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDetail {
    /// Field record with its resolved type.
    pub field: FieldDefinition,
    /// Owning form.
    pub form: FormDefinition,
}

/// Repository port for forms, fields, field types and submissions.
///
/// Field name uniqueness per form is enforced by the store; a violation is
/// reported as `AppError::Conflict`.
#[async_trait]
pub trait SchemaRepository: Send + Sync {
    /// Stores a new form.
    async fn create_form(&self, draft: FormDraft) -> AppResult<FormDefinition>;

    /// Replaces the editable attributes of a form.
    async fn update_form(&self, form_id: FormId, draft: FormDraft) -> AppResult<FormDefinition>;

    /// Deletes a form and its fields. Submissions are kept.
    async fn delete_form(&self, form_id: FormId) -> AppResult<()>;

    /// Finds a form without its fields.
    async fn find_form(&self, form_id: FormId) -> AppResult<Option<FormDefinition>>;

    /// Finds a form together with its ordered fields.
    async fn find_form_schema(&self, form_id: FormId) -> AppResult<Option<FormSchema>>;

    /// Lists forms with their fields, newest first.
    async fn list_form_schemas(
        &self,
        filter: &FormListFilter,
        query: ListQuery,
    ) -> AppResult<Page<FormSchema>>;

    /// Stores a new field type.
    async fn create_field_type(&self, draft: FieldTypeDraft) -> AppResult<FieldTypeDefinition>;

    /// Replaces the editable attributes of a field type.
    async fn update_field_type(
        &self,
        field_type_id: FieldTypeId,
        draft: FieldTypeDraft,
    ) -> AppResult<FieldTypeDefinition>;

    /// Deletes a field type that no field references.
    async fn delete_field_type(&self, field_type_id: FieldTypeId) -> AppResult<()>;

    /// Finds a field type.
    async fn find_field_type(
        &self,
        field_type_id: FieldTypeId,
    ) -> AppResult<Option<FieldTypeDefinition>>;

    /// Lists field types ordered by name.
    async fn list_field_types(&self, query: ListQuery) -> AppResult<Page<FieldTypeDefinition>>;

    /// Returns whether another field of the form already uses the name.
    async fn field_name_taken(
        &self,
        form_id: FormId,
        name: &str,
        excluding: Option<FieldId>,
    ) -> AppResult<bool>;

    /// Stores a new field.
    ///
    /// A name already used in the form is a `Conflict`. A form or field type
    /// that vanished since it was resolved is reported under `form_id` or
    /// `field_type_id`.
    async fn create_field(&self, draft: FieldDraft) -> AppResult<FieldDefinition>;

    /// Replaces a field's attributes. Errors as in `create_field`.
    async fn update_field(&self, field_id: FieldId, draft: FieldDraft)
    -> AppResult<FieldDefinition>;

    /// Deletes a field.
    async fn delete_field(&self, field_id: FieldId) -> AppResult<()>;

    /// Finds a field with its owning form.
    async fn find_field(&self, field_id: FieldId) -> AppResult<Option<FieldDetail>>;

    /// Lists fields ordered by form and declaration order.
    async fn list_fields(
        &self,
        filter: &FieldListFilter,
        query: ListQuery,
    ) -> AppResult<Page<FieldDetail>>;

    /// Stores a validated submission.
    async fn create_submission(&self, draft: SubmissionDraft) -> AppResult<Submission>;

    /// Finds a submission.
    async fn find_submission(&self, submission_id: SubmissionId) -> AppResult<Option<Submission>>;

    /// Lists submissions, newest first.
    async fn list_submissions(
        &self,
        filter: &SubmissionListFilter,
        query: ListQuery,
    ) -> AppResult<Page<Submission>>;
}

#[cfg(test)]
mod tests {
    use super::{ListQuery, MAX_PAGE_SIZE};

    #[test]
    fn list_query_clamps_limit() {
        assert_eq!(ListQuery::new(Some(0), None).limit, 1);
        assert_eq!(ListQuery::new(Some(10_000), Some(5)).limit, MAX_PAGE_SIZE);
        assert_eq!(ListQuery::default().offset, 0);
    }
}
