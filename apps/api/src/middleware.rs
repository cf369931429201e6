use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use dynaform_core::{AppError, AppResult, UserIdentity};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves the caller from the `Authorization` header and stores the
/// identity as a request extension. Requests without the header proceed
/// as anonymous. Unverifiable credentials proceed as a rejected identity so
/// disabled endpoints still answer 405 before the 401 is raised.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let bearer_token = bearer_token(&request);
    let identity = match identify(&state, bearer_token).await {
        Ok(identity) => identity,
        Err(AppError::Unauthorized(reason)) => {
            debug!(%reason, "request credentials rejected");
            UserIdentity::rejected(reason)
        }
        Err(error) => return Err(error.into()),
    };

    debug!(
        subject = identity.subject(),
        display_name = identity.display_name(),
        is_admin = identity.is_admin(),
        "resolved request identity"
    );
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

async fn identify(
    state: &AppState,
    bearer_token: AppResult<Option<String>>,
) -> AppResult<UserIdentity> {
    let bearer_token = bearer_token?;
    state
        .identity_service
        .resolve(bearer_token.as_deref())
        .await
}

fn bearer_token(request: &Request) -> AppResult<Option<String>> {
    let Some(value) = request.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("malformed authorization header".to_owned()))?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_owned()))?;

    Ok(Some(token.to_owned()))
}
