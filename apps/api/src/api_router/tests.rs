use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use dynaform_application::EndpointPolicies;
use dynaform_domain::{CrudAction, Resource, Surface};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::handlers::test_support::{ADMIN_TOKEN, MEMBER_TOKEN, body_json, test_state};

use super::build_router;

async fn router(policies: EndpointPolicies) -> Router {
    let (state, _) = test_state(policies).await;
    build_router(state, "http://localhost:3000").unwrap_or_else(|_| unreachable!())
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let request = builder.body(body).unwrap_or_else(|_| unreachable!());

    router
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn health_reports_in_memory_adapters() {
    let router = router(EndpointPolicies::defaults()).await;

    let response = send(&router, Method::GET, "/health", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["postgres"]["status"], json!("disabled"));
}

#[tokio::test]
async fn admin_surface_distinguishes_anonymous_unknown_and_non_admin_callers() {
    let router = router(EndpointPolicies::defaults()).await;

    let anonymous = send(&router, Method::GET, "/api/admin/forms", None, None).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let unknown = send(
        &router,
        Method::GET,
        "/api/admin/forms",
        Some("not-a-registered-token"),
        None,
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    let member = send(&router, Method::GET, "/api/admin/forms", Some(MEMBER_TOKEN), None).await;
    assert_eq!(member.status(), StatusCode::FORBIDDEN);

    let admin = send(&router, Method::GET, "/api/admin/forms", Some(ADMIN_TOKEN), None).await;
    assert_eq!(admin.status(), StatusCode::OK);
    assert_eq!(body_json(admin).await, json!({"count": 0, "results": []}));
}

#[tokio::test]
async fn disabled_action_is_405_for_every_caller() {
    let policies = EndpointPolicies::defaults()
        .with_enabled(Surface::Admin, Resource::Field, CrudAction::List, false)
        .unwrap_or_else(|_| unreachable!());
    let router = router(policies).await;

    for token in [
        None,
        Some("not-a-registered-token"),
        Some(MEMBER_TOKEN),
        Some(ADMIN_TOKEN),
    ] {
        let response = send(&router, Method::GET, "/api/admin/fields", token, None).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    let basic_auth = Request::builder()
        .method(Method::GET)
        .uri("/api/admin/fields")
        .header(AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
        .body(Body::empty())
        .unwrap_or_else(|_| unreachable!());
    let response = router
        .clone()
        .oneshot(basic_auth)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let enabled = send(
        &router,
        Method::GET,
        "/api/forms",
        Some("not-a-registered-token"),
        None,
    )
    .await;
    assert_eq!(enabled.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unsupported_methods_and_paths_are_rejected() {
    let router = router(EndpointPolicies::defaults()).await;

    let write_on_public = send(
        &router,
        Method::POST,
        "/api/forms",
        Some(ADMIN_TOKEN),
        Some(json!({"name": "Contact"})),
    )
    .await;
    assert_eq!(write_on_public.status(), StatusCode::METHOD_NOT_ALLOWED);

    let submission_delete = send(
        &router,
        Method::DELETE,
        "/api/admin/submissions/1",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(submission_delete.status(), StatusCode::METHOD_NOT_ALLOWED);

    let unknown_path = send(&router, Method::GET, "/api/widgets", None, None).await;
    assert_eq!(unknown_path.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn field_lifecycle_over_http() {
    let router = router(EndpointPolicies::defaults()).await;

    let form = send(
        &router,
        Method::POST,
        "/api/admin/forms",
        Some(ADMIN_TOKEN),
        Some(json!({"name": "Contact"})),
    )
    .await;
    assert_eq!(form.status(), StatusCode::CREATED);
    let form_id = body_json(form).await["id"].clone();

    let field_type = send(
        &router,
        Method::POST,
        "/api/admin/field-types",
        Some(ADMIN_TOKEN),
        Some(json!({"name": "Text", "code": "text"})),
    )
    .await;
    assert_eq!(field_type.status(), StatusCode::CREATED);
    let field_type_id = body_json(field_type).await["id"].clone();

    let payload = json!({"form_id": form_id, "field_type_id": field_type_id, "name": "nickname"});
    let field = send(
        &router,
        Method::POST,
        "/api/admin/fields",
        Some(ADMIN_TOKEN),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(field.status(), StatusCode::CREATED);
    let field = body_json(field).await;
    assert_eq!(field["form"]["id"], form_id);
    assert_eq!(field["field_type"]["code"], json!("text"));

    let duplicate = send(
        &router,
        Method::POST,
        "/api/admin/fields",
        Some(ADMIN_TOKEN),
        Some(payload),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(duplicate).await.get("name").is_some());

    let renamed = send(
        &router,
        Method::PATCH,
        &format!("/api/admin/fields/{}", field["id"]),
        Some(ADMIN_TOKEN),
        Some(json!({"name": "alias"})),
    )
    .await;
    assert_eq!(renamed.status(), StatusCode::OK);
    assert_eq!(body_json(renamed).await["name"], json!("alias"));

    let referenced = send(
        &router,
        Method::DELETE,
        &format!("/api/admin/field-types/{field_type_id}"),
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(referenced.status(), StatusCode::CONFLICT);

    let public_form = send(
        &router,
        Method::GET,
        &format!("/api/forms/{form_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(public_form.status(), StatusCode::OK);
    assert_eq!(body_json(public_form).await["fields"][0]["name"], json!("alias"));
}

#[tokio::test]
async fn malformed_path_ids_and_query_strings_use_json_errors() {
    let router = router(EndpointPolicies::defaults()).await;

    let bad_id = send(
        &router,
        Method::GET,
        "/api/admin/forms/abc",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(bad_id.status(), StatusCode::NOT_FOUND);
    assert!(body_json(bad_id).await["message"].is_string());

    let bad_limit = send(&router, Method::GET, "/api/forms?limit=-1", None, None).await;
    assert_eq!(bad_limit.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(bad_limit).await["non_field_errors"][0].is_string());
}

#[tokio::test]
async fn malformed_json_is_a_non_field_error() {
    let router = router(EndpointPolicies::defaults()).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/submissions")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap_or_else(|_| unreachable!());
    let response = router
        .oneshot(request)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await.get("non_field_errors").is_some());
}
