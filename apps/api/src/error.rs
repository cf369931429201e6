use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dynaform_core::{AppError, FieldErrors, NON_FIELD_ERRORS};
use serde::Serialize;
use tracing::error;
use ts_rs::TS;

/// API error payload for every non-validation failure.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self(AppError::Validation(value.body_text()))
    }
}

/// A path id that does not parse names no resource.
impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self(AppError::NotFound(value.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self(AppError::Validation(value.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::Validation(_) | AppError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match self.0 {
            AppError::InvalidFields(errors) => (status, Json(errors)).into_response(),
            AppError::Validation(message) => {
                (status, Json(FieldErrors::single(NON_FIELD_ERRORS, message))).into_response()
            }
            other => {
                if let AppError::Internal(detail) = &other {
                    error!(error = %detail, "request failed with internal error");
                }

                let payload = Json(ErrorResponse {
                    message: other.to_string(),
                });
                (status, payload).into_response()
            }
        }
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
