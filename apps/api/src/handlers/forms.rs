use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use dynaform_application::{CreateFormInput, FormListFilter, UpdateFormInput};
use dynaform_core::UserIdentity;
use dynaform_domain::{FormId, Surface};

use crate::dto::{
    CreateFormRequest, FormListParams, FormResponse, PageResponse, UpdateFormRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_public_forms_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    params: Result<Query<FormListParams>, QueryRejection>,
) -> ApiResult<Json<PageResponse<FormResponse>>> {
    let Query(params) = params?;
    list_forms(&state, &user, Surface::Public, params).await
}

pub async fn list_admin_forms_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    params: Result<Query<FormListParams>, QueryRejection>,
) -> ApiResult<Json<PageResponse<FormResponse>>> {
    let Query(params) = params?;
    list_forms(&state, &user, Surface::Admin, params).await
}

async fn list_forms(
    state: &AppState,
    user: &UserIdentity,
    surface: Surface,
    params: FormListParams,
) -> ApiResult<Json<PageResponse<FormResponse>>> {
    let query = params.list_query();
    let page = state
        .form_service
        .list_forms(
            user,
            surface,
            FormListFilter {
                search: params.search,
                is_active: params.is_active,
            },
            query,
        )
        .await?;

    Ok(Json(PageResponse::from_page(page, FormResponse::from)))
}

pub async fn get_public_form_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    form_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<FormResponse>> {
    let Path(form_id) = form_id?;
    let schema = state
        .form_service
        .get_form(&user, Surface::Public, FormId::new(form_id))
        .await?;
    Ok(Json(FormResponse::from(schema)))
}

pub async fn get_admin_form_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    form_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<FormResponse>> {
    let Path(form_id) = form_id?;
    let schema = state
        .form_service
        .get_form(&user, Surface::Admin, FormId::new(form_id))
        .await?;
    Ok(Json(FormResponse::from(schema)))
}

pub async fn create_form_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    payload: Result<Json<CreateFormRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FormResponse>)> {
    let Json(payload) = payload?;
    let schema = state
        .form_service
        .create_form(
            &user,
            CreateFormInput {
                name: payload.name,
                description: payload.description,
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(FormResponse::from(schema))))
}

pub async fn update_form_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    form_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateFormRequest>, JsonRejection>,
) -> ApiResult<Json<FormResponse>> {
    let Path(form_id) = form_id?;
    let Json(payload) = payload?;
    let schema = state
        .form_service
        .update_form(
            &user,
            FormId::new(form_id),
            UpdateFormInput {
                name: payload.name,
                description: payload.description,
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok(Json(FormResponse::from(schema)))
}

pub async fn delete_form_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    form_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(form_id) = form_id?;
    state
        .form_service
        .delete_form(&user, FormId::new(form_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
