mod cors;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use dynaform_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

use self::cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let public_routes = Router::new()
        .route(
            "/api/forms",
            get(handlers::forms::list_public_forms_handler),
        )
        .route(
            "/api/forms/{form_id}",
            get(handlers::forms::get_public_form_handler),
        )
        .route(
            "/api/fields",
            get(handlers::fields::list_public_fields_handler),
        )
        .route(
            "/api/fields/{field_id}",
            get(handlers::fields::get_public_field_handler),
        )
        .route(
            "/api/field-types",
            get(handlers::field_types::list_public_field_types_handler),
        )
        .route(
            "/api/field-types/{field_type_id}",
            get(handlers::field_types::get_public_field_type_handler),
        )
        .route(
            "/api/submissions",
            post(handlers::submissions::create_submission_handler),
        );

    let admin_routes = Router::new()
        .route(
            "/api/admin/forms",
            get(handlers::forms::list_admin_forms_handler)
                .post(handlers::forms::create_form_handler),
        )
        .route(
            "/api/admin/forms/{form_id}",
            get(handlers::forms::get_admin_form_handler)
                .patch(handlers::forms::update_form_handler)
                .delete(handlers::forms::delete_form_handler),
        )
        .route(
            "/api/admin/fields",
            get(handlers::fields::list_admin_fields_handler)
                .post(handlers::fields::create_field_handler),
        )
        .route(
            "/api/admin/fields/{field_id}",
            get(handlers::fields::get_admin_field_handler)
                .patch(handlers::fields::update_field_handler)
                .delete(handlers::fields::delete_field_handler),
        )
        .route(
            "/api/admin/field-types",
            get(handlers::field_types::list_admin_field_types_handler)
                .post(handlers::field_types::create_field_type_handler),
        )
        .route(
            "/api/admin/field-types/{field_type_id}",
            get(handlers::field_types::get_admin_field_type_handler)
                .patch(handlers::field_types::update_field_type_handler)
                .delete(handlers::field_types::delete_field_type_handler),
        )
        .route(
            "/api/admin/submissions",
            get(handlers::submissions::list_submissions_handler),
        )
        .route(
            "/api/admin/submissions/{submission_id}",
            get(handlers::submissions::get_submission_handler),
        );

    let api_routes = public_routes
        .merge(admin_routes)
        .method_not_allowed_fallback(handlers::method_not_allowed_handler)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::resolve_identity,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(api_routes)
        .fallback(handlers::not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .with_state(app_state))
}

#[cfg(test)]
mod tests;
