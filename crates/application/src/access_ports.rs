use async_trait::async_trait;
use dynaform_core::{AppResult, UserIdentity};
use dynaform_domain::Permission;

/// Repository port for permission lookups.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists permissions granted to a subject.
    async fn list_permissions_for_subject(&self, subject: &str) -> AppResult<Vec<Permission>>;
}

/// Repository port for API token credentials.
#[async_trait]
pub trait ApiTokenRepository: Send + Sync {
    /// Finds the identity bound to a SHA-256 token digest.
    async fn find_identity_by_token_hash(&self, token_hash: &str)
    -> AppResult<Option<UserIdentity>>;

    /// Stores or replaces the identity bound to a token digest.
    async fn save_api_token(&self, token_hash: &str, identity: &UserIdentity) -> AppResult<()>;
}
