use axum::{middleware, routing::{delete, get, post, put}, Router};
use std::sync::Arc;

use crate::handler::estimate_handler::{
    delete_estimate_handler,
    get_announcement_handler,
    get_estimate_handler,
    save_estimate_handler,
    search_estimates_handler,
    update_estimate_handler,
    upsert_announcement_handler,
};
use crate::middlewares::auth_middleware::{admin_auth, AuthState};
use crate::service::estimate_service::EstimateServiceImpl;

pub fn estimate_router(service: Arc<EstimateServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Quote boilerplate is readable without a session
    let public = Router::new().route("/announcements/{kind}", get(get_announcement_handler));

    // Estimates are back-office documents
    let admin = Router::new()
        .route("/estimates", post(save_estimate_handler))
        .route("/estimates/search", get(search_estimates_handler))
        .route("/estimates/{id}", get(get_estimate_handler))
        .route("/estimates/{id}", put(update_estimate_handler))
        .route("/estimates/{id}", delete(delete_estimate_handler))
        .route("/announcements/{kind}", put(upsert_announcement_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth));

    public
        .merge(admin)
        .with_state(service)
}
