//! Bearer token identity resolution.
//!
//! Tokens are never stored in clear text: only their SHA-256 digest is
//! persisted and compared.

use std::sync::Arc;

use dynaform_core::{AppError, AppResult, UserIdentity};

use crate::access_ports::ApiTokenRepository;

/// Minimum accepted length for a registered API token.
pub const MIN_API_TOKEN_LENGTH: usize = 32;

/// Application service mapping bearer tokens to caller identities.
#[derive(Clone)]
pub struct IdentityService {
    token_repository: Arc<dyn ApiTokenRepository>,
}

impl IdentityService {
    /// Creates a new identity service.
    #[must_use]
    pub fn new(token_repository: Arc<dyn ApiTokenRepository>) -> Self {
        Self { token_repository }
    }

    /// Resolves the caller behind an optional bearer token.
    ///
    /// No token means an anonymous caller; a token that matches no stored
    /// digest is rejected.
    pub async fn resolve(&self, bearer_token: Option<&str>) -> AppResult<UserIdentity> {
        let Some(raw_token) = bearer_token else {
            return Ok(UserIdentity::anonymous());
        };

        self.token_repository
            .find_identity_by_token_hash(&hash_token(raw_token.trim()))
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid API token".to_owned()))
    }

    /// Registers a token for an identity, replacing any previous binding.
    /// Surrounding whitespace is not part of the token.
    pub async fn register_api_token(
        &self,
        raw_token: &str,
        identity: &UserIdentity,
    ) -> AppResult<()> {
        let token = raw_token.trim();
        if token.chars().count() < MIN_API_TOKEN_LENGTH {
            return Err(AppError::Validation(format!(
                "API token must be at least {MIN_API_TOKEN_LENGTH} characters"
            )));
        }

        self.token_repository
            .save_api_token(&hash_token(token), identity)
            .await
    }
}

/// Computes the SHA-256 hex digest of a token string for storage.
#[must_use]
pub fn hash_token(raw_token: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write;

    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    let result = hasher.finalize();

    result
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}
