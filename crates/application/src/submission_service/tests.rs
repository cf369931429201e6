use std::sync::Arc;

use dynaform_core::{AppError, UserIdentity};
use dynaform_domain::{
    FieldDraft, FieldTypeCode, FieldTypeDraft, FormDefinition, FormDraft, Submission,
};
use serde_json::json;

use crate::endpoint_policy::EndpointPolicies;
use crate::schema_ports::{ListQuery, SchemaRepository};
use crate::test_support::{FakeSchemaRepository, access_service, admin, member};

use super::{CreateSubmissionInput, SubmissionService};

async fn contact_form(repository: &FakeSchemaRepository) -> FormDefinition {
    let form = repository
        .create_form(FormDraft::new("Contact", None, true).unwrap_or_else(|_| unreachable!()))
        .await
        .unwrap_or_else(|_| unreachable!());

    for (name, code, required) in [
        ("email", FieldTypeCode::Email, true),
        ("age", FieldTypeCode::Number, false),
    ] {
        let field_type = repository
            .create_field_type(
                FieldTypeDraft::new(code.as_str(), code, None, None)
                    .unwrap_or_else(|_| unreachable!()),
            )
            .await
            .unwrap_or_else(|_| unreachable!());
        let draft = FieldDraft::new(form.id(), field_type, name, required, None)
            .unwrap_or_else(|_| unreachable!());
        let created = repository.create_field(draft).await;
        assert!(created.is_ok());
    }

    form
}

fn service(repository: Arc<FakeSchemaRepository>) -> SubmissionService {
    SubmissionService::new(repository, access_service(EndpointPolicies::defaults()))
}

async fn submit(
    service: &SubmissionService,
    form: &FormDefinition,
    payload: serde_json::Value,
) -> Result<Submission, AppError> {
    service
        .submit(
            &UserIdentity::anonymous(),
            CreateSubmissionInput {
                form: Some(form.id().as_i64()),
                submitted_data: Some(payload),
            },
        )
        .await
}

#[tokio::test]
async fn contact_scenario_accepts_and_rejects() {
    let repository = Arc::new(FakeSchemaRepository::default());
    let form = contact_form(&repository).await;
    let service = service(repository.clone());

    let accepted = submit(&service, &form, json!({"email": "a@b.com"}))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(accepted.form_id(), form.id());
    assert_eq!(accepted.form_name().as_str(), "Contact");

    let rejected = submit(&service, &form, json!({"age": "thirty"})).await;
    let Err(AppError::InvalidFields(errors)) = rejected else {
        unreachable!()
    };
    assert!(errors.contains("email"));
    assert!(errors.contains("age"));

    let stored = service
        .list_submissions(&admin(), Some(form.id()), ListQuery::default())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(stored.count, 1);
}

#[tokio::test]
async fn missing_keys_and_unknown_forms_are_field_errors() {
    let repository = Arc::new(FakeSchemaRepository::default());
    let service = service(repository);

    let empty = service
        .submit(&UserIdentity::anonymous(), CreateSubmissionInput::default())
        .await;
    let Err(AppError::InvalidFields(errors)) = empty else {
        unreachable!()
    };
    assert!(errors.contains("form"));
    assert!(errors.contains("submitted_data"));

    let unknown = service
        .submit(
            &UserIdentity::anonymous(),
            CreateSubmissionInput {
                form: Some(42),
                submitted_data: Some(json!({})),
            },
        )
        .await;
    let Err(AppError::InvalidFields(errors)) = unknown else {
        unreachable!()
    };
    assert!(errors.contains("form"));
}

#[tokio::test]
async fn submissions_survive_form_deletion() {
    let repository = Arc::new(FakeSchemaRepository::default());
    let form = contact_form(&repository).await;
    let service = service(repository.clone());

    let submission = submit(&service, &form, json!({"email": "a@b.com", "extra": 1}))
        .await
        .unwrap_or_else(|_| unreachable!());

    let deleted = repository.delete_form(form.id()).await;
    assert!(deleted.is_ok());

    let reloaded = service
        .get_submission(&admin(), submission.id())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(reloaded.submitted_data(), submission.submitted_data());
    assert_eq!(reloaded.submitted_data().get("extra"), Some(&json!(1)));
}

#[tokio::test]
async fn reading_submissions_requires_admin() {
    let service = service(Arc::new(FakeSchemaRepository::default()));

    let anonymous = service
        .list_submissions(&UserIdentity::anonymous(), None, ListQuery::default())
        .await;
    assert!(matches!(anonymous, Err(AppError::Unauthorized(_))));

    let non_admin = service
        .list_submissions(&member(), None, ListQuery::default())
        .await;
    assert!(matches!(non_admin, Err(AppError::Forbidden(_))));
}
