use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use dynaform_application::{EndpointPolicies, IdentityService};
use dynaform_core::UserIdentity;
use dynaform_infrastructure::{InMemoryAccessRepository, InMemorySchemaRepository};
use serde_json::Value;

use crate::state::AppState;

pub(crate) const ADMIN_TOKEN: &str = "admin-token-0123456789abcdefghijklmnop";
pub(crate) const MEMBER_TOKEN: &str = "member-token-0123456789abcdefghijklmno";

pub(crate) fn admin() -> UserIdentity {
    UserIdentity::new("alice", "Alice", true)
}

pub(crate) fn member() -> UserIdentity {
    UserIdentity::new("bob", "Bob", false)
}

/// Builds state over fresh in-memory adapters, with admin and member tokens registered.
pub(crate) async fn test_state(policies: EndpointPolicies) -> (AppState, Arc<InMemoryAccessRepository>) {
    let access_repository = Arc::new(InMemoryAccessRepository::new());
    let identity_service = IdentityService::new(access_repository.clone());
    for (token, identity) in [(ADMIN_TOKEN, admin()), (MEMBER_TOKEN, member())] {
        identity_service
            .register_api_token(token, &identity)
            .await
            .unwrap_or_else(|_| unreachable!());
    }

    let state = AppState::new(
        Arc::new(InMemorySchemaRepository::new()),
        access_repository.clone(),
        access_repository.clone(),
        policies,
        None,
    );

    (state, access_repository)
}

pub(crate) async fn body_json(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|_| unreachable!());
    serde_json::from_slice(&body).unwrap_or_else(|_| unreachable!())
}
