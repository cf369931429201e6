pub mod field_types;
pub mod fields;
pub mod forms;
pub mod health;
pub mod submissions;

use dynaform_core::AppError;

use crate::error::ApiError;

/// Fallback for paths that match no route.
pub async fn not_found_handler() -> ApiError {
    ApiError(AppError::NotFound("no route matches this path".to_owned()))
}

/// Fallback for routed paths called with an unsupported method.
pub async fn method_not_allowed_handler() -> ApiError {
    ApiError(AppError::MethodNotAllowed(
        "method is not supported for this endpoint".to_owned(),
    ))
}

#[cfg(test)]
pub(crate) mod test_support;
