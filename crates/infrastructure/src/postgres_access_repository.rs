use std::str::FromStr;

use async_trait::async_trait;

use dynaform_application::{ApiTokenRepository, AuthorizationRepository};
use dynaform_core::{AppError, AppResult, UserIdentity};
use dynaform_domain::Permission;

use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed repository for API tokens and subject permission
/// grants.
#[derive(Clone)]
pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grants a permission to a subject. Granting twice is a no-op.
    pub async fn grant_permission(&self, subject: &str, permission: Permission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO subject_permissions (subject, permission)
            VALUES ($1, $2)
            ON CONFLICT (subject, permission) DO NOTHING
            "#,
        )
        .bind(subject)
        .bind(permission.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to grant permission '{}' to subject '{subject}': {error}",
                permission.as_str()
            ))
        })?;

        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    permission: String,
}

#[derive(Debug, FromRow)]
struct ApiTokenRow {
    subject: String,
    display_name: String,
    is_admin: bool,
}

#[async_trait]
impl AuthorizationRepository for PostgresAccessRepository {
    async fn list_permissions_for_subject(&self, subject: &str) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permission
            FROM subject_permissions
            WHERE subject = $1
            ORDER BY permission
            "#,
        )
        .bind(subject)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permissions: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Permission::from_str(row.permission.as_str()).map_err(|error| {
                    AppError::Internal(format!(
                        "failed to decode permission '{}' for subject '{subject}': {error}",
                        row.permission
                    ))
                })
            })
            .collect()
    }
}

#[async_trait]
impl ApiTokenRepository for PostgresAccessRepository {
    async fn find_identity_by_token_hash(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<UserIdentity>> {
        let row = sqlx::query_as::<_, ApiTokenRow>(
            r#"
            SELECT subject, display_name, is_admin
            FROM api_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to look up API token: {error}")))?;

        Ok(row.map(|row| UserIdentity::new(row.subject, row.display_name, row.is_admin)))
    }

    async fn save_api_token(&self, token_hash: &str, identity: &UserIdentity) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO api_tokens (token_hash, subject, display_name, is_admin)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (token_hash) DO UPDATE SET
                subject = EXCLUDED.subject,
                display_name = EXCLUDED.display_name,
                is_admin = EXCLUDED.is_admin
            "#,
        )
        .bind(token_hash)
        .bind(identity.subject())
        .bind(identity.display_name())
        .bind(identity.is_admin())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save API token for subject '{}': {error}",
                identity.subject()
            ))
        })?;

        Ok(())
    }
}
