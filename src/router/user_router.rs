use axum::{middleware, routing::{delete, get, post}, Router};
use std::sync::Arc;

use crate::handler::user_handler::{
    delete_user_handler,
    list_users_handler,
    login_handler,
    purge_user_handler,
    refresh_token_handler,
    register_handler,
};
use crate::middlewares::auth_middleware::{admin_auth, user_auth, AuthState};
use crate::service::user_service::UserServiceImpl;

pub fn user_router(service: Arc<UserServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Public auth routes
    let public = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/refresh-token", post(refresh_token_handler));

    // Requires a valid session; ownership is checked in the service
    let authenticated = Router::new()
        .route("/users/{id}", delete(delete_user_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), user_auth));

    // Admin-only dashboard and cascade delete
    let admin = Router::new()
        .route("/users", get(list_users_handler))
        .route("/users/{id}/purge", delete(purge_user_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth));

    public
        .merge(authenticated)
        .merge(admin)
        .with_state(service)
}
