use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use bson::oid::ObjectId;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::dto::estimate_dto::{EstimateSearchQuery, EstimateSearchResponse, SaveEstimateRequest};
use crate::repository::estimate_repo::{EstimateSearchField, EstimateSearchFilter};
use crate::service::estimate_service::{EstimateService, EstimateServiceImpl};
use crate::util::error::HandlerError;

/// Search results are safe to cache briefly
const SEARCH_CACHE_CONTROL: &str = "public, max-age=10";

fn parse_estimate_id(raw: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(raw).map_err(|_| HandlerError::bad_request("Invalid estimate id"))
}

fn validated(payload: SaveEstimateRequest) -> Result<SaveEstimateRequest, HandlerError> {
    payload
        .validate()
        .map_err(|e| HandlerError::bad_request(format!("Validation error: {}", e)))?;
    Ok(payload)
}

// Handler: Save a new estimate (admin only)
pub async fn save_estimate_handler(
    State(service): State<Arc<EstimateServiceImpl>>,
    Json(payload): Json<SaveEstimateRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = validated(payload)?;
    let created = service.save_estimate(payload).await.map_err(HandlerError::from)?;
    Ok((StatusCode::CREATED, Json(created)))
}

// Handler: Fetch one estimate (admin only)
pub async fn get_estimate_handler(
    State(service): State<Arc<EstimateServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_estimate_id(&id)?;
    let estimate = service.get_estimate(id).await.map_err(HandlerError::from)?;
    Ok(Json(estimate))
}

// Handler: Replace an estimate (admin only)
pub async fn update_estimate_handler(
    State(service): State<Arc<EstimateServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<SaveEstimateRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_estimate_id(&id)?;
    let payload = validated(payload)?;
    let updated = service.update_estimate(id, payload).await.map_err(HandlerError::from)?;
    Ok(Json(updated))
}

// Handler: Delete an estimate (admin only)
pub async fn delete_estimate_handler(
    State(service): State<Arc<EstimateServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_estimate_id(&id)?;
    service.delete_estimate(id).await.map_err(HandlerError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

// Handler: Search estimates (admin only)
pub async fn search_estimates_handler(
    State(service): State<Arc<EstimateServiceImpl>>,
    Query(params): Query<EstimateSearchQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let search_field = match params.search_type.as_deref() {
        Some(raw) => EstimateSearchField::parse(raw)
            .ok_or_else(|| HandlerError::bad_request(format!("Unknown search type '{}'", raw)))?,
        None => EstimateSearchField::default(),
    };

    let filter = EstimateSearchFilter {
        keyword: params.keyword,
        search_field,
        estimate_type: params.estimate_type,
        contractor_status: params.contractor_status,
        start_date: params.start_date,
        end_date: params.end_date,
    };

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let (estimates, total) = service
        .search_estimates(filter, page, limit)
        .await
        .map_err(HandlerError::from)?;

    Ok((
        [(header::CACHE_CONTROL, SEARCH_CACHE_CONTROL)],
        Json(EstimateSearchResponse { estimates, total, page, limit }),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertAnnouncementRequest {
    #[validate(length(min = 1, max = 20000))]
    pub content: String,
}

// Handler: Fetch the announcement text shown on quotes
pub async fn get_announcement_handler(
    State(service): State<Arc<EstimateServiceImpl>>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let announcement = service.get_announcement(&kind).await.map_err(HandlerError::from)?;
    Ok(Json(announcement))
}

// Handler: Replace the announcement text for one kind (admin only)
pub async fn upsert_announcement_handler(
    State(service): State<Arc<EstimateServiceImpl>>,
    Path(kind): Path<String>,
    Json(payload): Json<UpsertAnnouncementRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let announcement = service
        .upsert_announcement(&kind, &payload.content)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(announcement))
}
