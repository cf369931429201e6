use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use dynaform_application::{CreateFieldTypeInput, UpdateFieldTypeInput};
use dynaform_core::UserIdentity;
use dynaform_domain::{FieldTypeId, Surface};

use crate::dto::{
    CreateFieldTypeRequest, FieldTypeResponse, PageParams, PageResponse, UpdateFieldTypeRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_public_field_types_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<PageResponse<FieldTypeResponse>>> {
    let Query(params) = params?;
    list_field_types(&state, &user, Surface::Public, &params).await
}

pub async fn list_admin_field_types_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<PageResponse<FieldTypeResponse>>> {
    let Query(params) = params?;
    list_field_types(&state, &user, Surface::Admin, &params).await
}

async fn list_field_types(
    state: &AppState,
    user: &UserIdentity,
    surface: Surface,
    params: &PageParams,
) -> ApiResult<Json<PageResponse<FieldTypeResponse>>> {
    let page = state
        .field_type_service
        .list_field_types(user, surface, params.list_query())
        .await?;
    Ok(Json(PageResponse::from_page(page, FieldTypeResponse::from)))
}

pub async fn get_public_field_type_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    field_type_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<FieldTypeResponse>> {
    let Path(field_type_id) = field_type_id?;
    let field_type = state
        .field_type_service
        .get_field_type(&user, Surface::Public, FieldTypeId::new(field_type_id))
        .await?;
    Ok(Json(FieldTypeResponse::from(field_type)))
}

pub async fn get_admin_field_type_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    field_type_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<FieldTypeResponse>> {
    let Path(field_type_id) = field_type_id?;
    let field_type = state
        .field_type_service
        .get_field_type(&user, Surface::Admin, FieldTypeId::new(field_type_id))
        .await?;
    Ok(Json(FieldTypeResponse::from(field_type)))
}

pub async fn create_field_type_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    payload: Result<Json<CreateFieldTypeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FieldTypeResponse>)> {
    let Json(payload) = payload?;
    let field_type = state
        .field_type_service
        .create_field_type(
            &user,
            CreateFieldTypeInput {
                name: payload.name,
                code: payload.code,
                description: payload.description,
                validation_metadata: payload.validation_metadata,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(FieldTypeResponse::from(field_type))))
}

pub async fn update_field_type_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    field_type_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateFieldTypeRequest>, JsonRejection>,
) -> ApiResult<Json<FieldTypeResponse>> {
    let Path(field_type_id) = field_type_id?;
    let Json(payload) = payload?;
    let field_type = state
        .field_type_service
        .update_field_type(
            &user,
            FieldTypeId::new(field_type_id),
            UpdateFieldTypeInput {
                name: payload.name,
                code: payload.code,
                description: payload.description,
                validation_metadata: payload.validation_metadata,
            },
        )
        .await?;
    Ok(Json(FieldTypeResponse::from(field_type)))
}

pub async fn delete_field_type_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    field_type_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(field_type_id) = field_type_id?;
    state
        .field_type_service
        .delete_field_type(&user, FieldTypeId::new(field_type_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
