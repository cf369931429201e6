use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use dynaform_application::CreateSubmissionInput;
use dynaform_core::UserIdentity;
use dynaform_domain::{FormId, SubmissionId};
use tracing::info;

use crate::dto::{
    CreateSubmissionRequest, PageResponse, SubmissionListParams, SubmissionResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_submission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    payload: Result<Json<CreateSubmissionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubmissionResponse>)> {
    let Json(payload) = payload?;
    let submission = state
        .submission_service
        .submit(
            &user,
            CreateSubmissionInput {
                form: payload.form,
                submitted_data: payload.submitted_data,
            },
        )
        .await?;

    info!(
        submission_id = submission.id().as_i64(),
        form_id = submission.form_id().as_i64(),
        "form submission stored"
    );
    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse::from(submission)),
    ))
}

pub async fn list_submissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    params: Result<Query<SubmissionListParams>, QueryRejection>,
) -> ApiResult<Json<PageResponse<SubmissionResponse>>> {
    let Query(params) = params?;
    let page = state
        .submission_service
        .list_submissions(&user, params.form_id.map(FormId::new), params.list_query())
        .await?;
    Ok(Json(PageResponse::from_page(page, SubmissionResponse::from)))
}

pub async fn get_submission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    submission_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<SubmissionResponse>> {
    let Path(submission_id) = submission_id?;
    let submission = state
        .submission_service
        .get_submission(&user, SubmissionId::new(submission_id))
        .await?;
    Ok(Json(SubmissionResponse::from(submission)))
}
