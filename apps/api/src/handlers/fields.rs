use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use dynaform_application::{CreateFieldInput, UpdateFieldInput};
use dynaform_core::UserIdentity;
use dynaform_domain::{FieldId, FormId, Surface};

use crate::dto::{
    CreateFieldRequest, FieldListParams, FieldResponse, PageResponse, UpdateFieldRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_public_fields_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    params: Result<Query<FieldListParams>, QueryRejection>,
) -> ApiResult<Json<PageResponse<FieldResponse>>> {
    let Query(params) = params?;
    list_fields(&state, &user, Surface::Public, &params).await
}

pub async fn list_admin_fields_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    params: Result<Query<FieldListParams>, QueryRejection>,
) -> ApiResult<Json<PageResponse<FieldResponse>>> {
    let Query(params) = params?;
    list_fields(&state, &user, Surface::Admin, &params).await
}

async fn list_fields(
    state: &AppState,
    user: &UserIdentity,
    surface: Surface,
    params: &FieldListParams,
) -> ApiResult<Json<PageResponse<FieldResponse>>> {
    let page = state
        .field_service
        .list_fields(
            user,
            surface,
            params.form_id.map(FormId::new),
            params.list_query(),
        )
        .await?;
    Ok(Json(PageResponse::from_page(page, FieldResponse::from)))
}

pub async fn get_public_field_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    field_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<FieldResponse>> {
    let Path(field_id) = field_id?;
    let detail = state
        .field_service
        .get_field(&user, Surface::Public, FieldId::new(field_id))
        .await?;
    Ok(Json(FieldResponse::from(detail)))
}

pub async fn get_admin_field_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    field_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<FieldResponse>> {
    let Path(field_id) = field_id?;
    let detail = state
        .field_service
        .get_field(&user, Surface::Admin, FieldId::new(field_id))
        .await?;
    Ok(Json(FieldResponse::from(detail)))
}

pub async fn create_field_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    payload: Result<Json<CreateFieldRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FieldResponse>)> {
    let Json(payload) = payload?;
    let detail = state
        .field_service
        .create_field(
            &user,
            CreateFieldInput {
                form_id: payload.form_id,
                field_type_id: payload.field_type_id,
                name: payload.name,
                is_required: payload.is_required,
                choices: payload.choices,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(FieldResponse::from(detail))))
}

pub async fn update_field_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    field_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateFieldRequest>, JsonRejection>,
) -> ApiResult<Json<FieldResponse>> {
    let Path(field_id) = field_id?;
    let Json(payload) = payload?;
    let detail = state
        .field_service
        .update_field(
            &user,
            FieldId::new(field_id),
            UpdateFieldInput {
                form_id: payload.form_id,
                field_type_id: payload.field_type_id,
                name: payload.name,
                is_required: payload.is_required,
                choices: payload.choices,
            },
        )
        .await?;
    Ok(Json(FieldResponse::from(detail)))
}

pub async fn delete_field_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    field_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(field_id) = field_id?;
    state
        .field_service
        .delete_field(&user, FieldId::new(field_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
