//! Dynaform API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use dynaform_application::IdentityService;
use dynaform_core::{AppError, UserIdentity};
use dynaform_infrastructure::{PostgresAccessRepository, PostgresSchemaRepository};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

/// Subject the bootstrap admin token is registered for.
const BOOTSTRAP_ADMIN_SUBJECT: &str = "bootstrap-admin";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let schema_repository = Arc::new(PostgresSchemaRepository::new(pool.clone()));
    let access_repository = Arc::new(PostgresAccessRepository::new(pool.clone()));

    if let Some(token) = &config.bootstrap_admin_token {
        IdentityService::new(access_repository.clone())
            .register_api_token(
                token,
                &UserIdentity::new(BOOTSTRAP_ADMIN_SUBJECT, "Bootstrap admin", true),
            )
            .await?;
        info!(
            subject = BOOTSTRAP_ADMIN_SUBJECT,
            "bootstrap admin token registered"
        );
    }

    let app_state = AppState::new(
        schema_repository,
        access_repository.clone(),
        access_repository,
        config.endpoint_policies.clone(),
        Some(pool),
    );

    let app = api_router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "dynaform-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
