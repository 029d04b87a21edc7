use axum::{middleware, routing::delete, Router};
use std::sync::Arc;

use crate::handler::storage_handler::delete_object_handler;
use crate::middlewares::auth_middleware::{admin_auth, AuthState};
use crate::util::minio::ObjectStorage;

pub fn storage_router(storage: Arc<dyn ObjectStorage>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/storage/object", delete(delete_object_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth))
        .with_state(storage)
}
