use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use dynaform_application::{ApiTokenRepository, AuthorizationRepository};
use dynaform_core::{AppResult, UserIdentity};
use dynaform_domain::Permission;
use tokio::sync::RwLock;

/// In-memory API token and permission grant store.
#[derive(Debug, Default)]
pub struct InMemoryAccessRepository {
    tokens: RwLock<HashMap<String, UserIdentity>>,
    grants: RwLock<HashMap<String, HashSet<Permission>>>,
}

impl InMemoryAccessRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants a permission to a subject.
    pub async fn grant_permission(&self, subject: &str, permission: Permission) {
        self.grants
            .write()
            .await
            .entry(subject.to_owned())
            .or_default()
            .insert(permission);
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAccessRepository {
    async fn list_permissions_for_subject(&self, subject: &str) -> AppResult<Vec<Permission>> {
        let grants = self.grants.read().await;
        let mut permissions: Vec<Permission> = grants
            .get(subject)
            .map(|granted| granted.iter().copied().collect())
            .unwrap_or_default();
        permissions.sort_by_key(Permission::as_str);

        Ok(permissions)
    }
}

#[async_trait]
impl ApiTokenRepository for InMemoryAccessRepository {
    async fn find_identity_by_token_hash(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<UserIdentity>> {
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn save_api_token(&self, token_hash: &str, identity: &UserIdentity) -> AppResult<()> {
        self.tokens
            .write()
            .await
            .insert(token_hash.to_owned(), identity.clone());
        Ok(())
    }
}
