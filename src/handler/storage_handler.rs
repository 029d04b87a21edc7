use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use tracing::{error, info};

use crate::dto::storage_dto::{DeleteObjectRequest, DeleteObjectResponse};
use crate::util::error::HandlerError;
use crate::util::minio::ObjectStorage;

// Handler: Delete one remote object by key (admin only)
pub async fn delete_object_handler(
    State(storage): State<Arc<dyn ObjectStorage>>,
    Json(payload): Json<DeleteObjectRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let object_key = match payload.object_key {
        Some(key) if !key.trim().is_empty() => key,
        _ => return Err(HandlerError::bad_request("Missing object key")),
    };

    info!("Deleting storage object '{}'", object_key);
    storage.remove_object(&object_key).await.map_err(|e| {
        error!("Failed to delete storage object '{}': {}", object_key, e);
        HandlerError::internal(format!("Failed to delete object: {}", e))
    })?;

    Ok(Json(DeleteObjectResponse { deleted: true, object_key }))
}
