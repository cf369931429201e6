use std::sync::Arc;

use dynaform_application::{
    AccessService, ApiTokenRepository, AuthorizationRepository, EndpointPolicies, FieldService,
    FieldTypeService, FormService, IdentityService, SchemaRepository, SubmissionService,
};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub form_service: FormService,
    pub field_service: FieldService,
    pub field_type_service: FieldTypeService,
    pub submission_service: SubmissionService,
    pub identity_service: IdentityService,
    /// Pool probed by the health check; `None` when running on in-memory adapters.
    pub postgres_pool: Option<PgPool>,
}

impl AppState {
    /// Wires every service against the given adapters and policy table.
    pub fn new(
        schema_repository: Arc<dyn SchemaRepository>,
        authorization_repository: Arc<dyn AuthorizationRepository>,
        token_repository: Arc<dyn ApiTokenRepository>,
        endpoint_policies: EndpointPolicies,
        postgres_pool: Option<PgPool>,
    ) -> Self {
        let access_service =
            AccessService::new(Arc::new(endpoint_policies), authorization_repository);

        Self {
            form_service: FormService::new(schema_repository.clone(), access_service.clone()),
            field_service: FieldService::new(schema_repository.clone(), access_service.clone()),
            field_type_service: FieldTypeService::new(
                schema_repository.clone(),
                access_service.clone(),
            ),
            submission_service: SubmissionService::new(schema_repository, access_service),
            identity_service: IdentityService::new(token_repository),
            postgres_pool,
        }
    }
}
