use axum::{middleware, routing::{delete, get, patch, post}, Router};
use std::sync::Arc;

use crate::handler::application_handler::{
    attach_application_files_handler,
    cancel_application_handler,
    create_application_handler,
    get_application_handler,
    list_applications_handler,
    purge_application_handler,
    update_application_status_handler,
};
use crate::middlewares::auth_middleware::{admin_auth, user_auth, AuthState};
use crate::service::application_service::ApplicationServiceImpl;

pub fn application_router(service: Arc<ApplicationServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Customer routes; ownership is enforced in the service
    let authenticated = Router::new()
        .route("/applications", post(create_application_handler))
        .route("/applications/{id}", get(get_application_handler))
        .route("/applications/{id}/files", post(attach_application_files_handler))
        .route("/applications/{id}", delete(cancel_application_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), user_auth));

    // Admin-protected routes
    let admin = Router::new()
        .route("/applications", get(list_applications_handler))
        .route("/applications/status", patch(update_application_status_handler))
        .route("/applications/{id}/purge", delete(purge_application_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth));

    authenticated
        .merge(admin)
        .with_state(service)
}
