use axum::extract::{Extension, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bson::oid::ObjectId;
use std::sync::Arc;
use validator::Validate;

use crate::dto::review_dto::{CreateReviewRequest, ReviewListQuery, ReviewListResponse, UpdateReviewStatusRequest};
use crate::handler::read_multipart;
use crate::model::review::ReviewStatus;
use crate::service::review_service::{ReviewService, ReviewServiceImpl};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

fn parse_review_id(raw: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(raw).map_err(|_| HandlerError::bad_request("Invalid review id"))
}

// Handler: Submit a review with up to five images (multipart)
pub async fn create_review_handler(
    State(service): State<Arc<ReviewServiceImpl>>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let (json_data, images) = read_multipart(multipart).await?;

    let json_data = json_data.ok_or_else(|| HandlerError::bad_request("Missing review JSON data"))?;
    let payload: CreateReviewRequest = serde_json::from_slice(&json_data)
        .map_err(|e| HandlerError::bad_request(format!("Invalid JSON: {}", e)))?;
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }

    let user_id = ObjectId::parse_str(&claims.sub).map_err(|_| HandlerError::bad_request("Invalid user id"))?;
    let created = service.create_review(user_id, payload, images).await.map_err(HandlerError::from)?;
    Ok((StatusCode::CREATED, Json(created)))
}

// Handler: Public listing of active reviews
pub async fn list_reviews_handler(
    State(service): State<Arc<ReviewServiceImpl>>,
    Query(params): Query<ReviewListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let reviews = service.list_visible_reviews(page, limit).await.map_err(HandlerError::from)?;
    Ok(Json(ReviewListResponse { reviews }))
}

// Handler: Moderate review visibility (admin only)
pub async fn update_review_status_handler(
    State(service): State<Arc<ReviewServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateReviewStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let id = parse_review_id(&id)?;
    let status = ReviewStatus::parse(&payload.status)
        .ok_or_else(|| HandlerError::bad_request(format!("Unknown status '{}'", payload.status)))?;
    let updated = service.update_review_status(id, status).await.map_err(HandlerError::from)?;
    Ok(Json(updated))
}

// Handler: Soft-delete a review (owner or admin)
pub async fn delete_review_handler(
    State(service): State<Arc<ReviewServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_review_id(&id)?;
    let deleted = service.soft_delete_review(id, &claims).await.map_err(HandlerError::from)?;
    Ok(Json(deleted))
}

// Handler: Permanently delete a soft-deleted review (admin only)
pub async fn purge_review_handler(
    State(service): State<Arc<ReviewServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_review_id(&id)?;
    let result = service.purge_review(id).await.map_err(HandlerError::from)?;
    Ok(Json(result))
}
