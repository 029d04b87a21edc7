use axum::{middleware, routing::{delete, get, patch, post}, Router};
use std::sync::Arc;

use crate::handler::review_handler::{
    create_review_handler,
    delete_review_handler,
    list_reviews_handler,
    purge_review_handler,
    update_review_status_handler,
};
use crate::middlewares::auth_middleware::{admin_auth, user_auth, AuthState};
use crate::service::review_service::ReviewServiceImpl;

pub fn review_router(service: Arc<ReviewServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Public listing of active reviews
    let public = Router::new().route("/reviews", get(list_reviews_handler));

    let authenticated = Router::new()
        .route("/reviews", post(create_review_handler))
        .route("/reviews/{id}", delete(delete_review_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), user_auth));

    // Moderation and permanent deletion
    let admin = Router::new()
        .route("/reviews/{id}/status", patch(update_review_status_handler))
        .route("/reviews/{id}/purge", delete(purge_review_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth));

    public
        .merge(authenticated)
        .merge(admin)
        .with_state(service)
}
