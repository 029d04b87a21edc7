use axum::extract::{Extension, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::dto::application_dto::{ApplicationListQuery, ApplicationListResponse, UpdateApplicationStatusRequest};
use crate::handler::read_multipart;
use crate::model::application::{ApplicationDetails, ApplicationStatus, ApplicationType};
use crate::repository::application_repo::ApplicationFilter;
use crate::service::application_service::{ApplicationService, ApplicationServiceImpl};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(raw).map_err(|_| HandlerError::bad_request(format!("Invalid {} id", what)))
}

// Handler: Submit a service application (multipart: json + files)
pub async fn create_application_handler(
    State(service): State<Arc<ApplicationServiceImpl>>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[create_application_handler] Handler called");
    let (json_data, files) = read_multipart(multipart).await?;

    let json_data = json_data.ok_or_else(|| HandlerError::bad_request("Missing application JSON data"))?;
    let details: ApplicationDetails = serde_json::from_slice(&json_data)
        .map_err(|e| HandlerError::bad_request(format!("Invalid JSON: {}", e)))?;

    let user_id = parse_object_id(&claims.sub, "user")?;
    let created = service
        .create_application(user_id, details, files)
        .await
        .map_err(HandlerError::from)?;
    Ok((StatusCode::CREATED, Json(created)))
}

// Handler: Fetch one application (owner or admin)
pub async fn get_application_handler(
    State(service): State<Arc<ApplicationServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "application")?;
    let application = service.get_application(id, &claims).await.map_err(HandlerError::from)?;
    Ok(Json(application))
}

// Handler: List applications with filters (admin only)
pub async fn list_applications_handler(
    State(service): State<Arc<ApplicationServiceImpl>>,
    Query(params): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let status = match params.status.as_deref() {
        Some(raw) => Some(
            ApplicationStatus::parse(raw)
                .ok_or_else(|| HandlerError::bad_request(format!("Unknown status '{}'", raw)))?,
        ),
        None => None,
    };
    let app_type = match params.app_type.as_deref() {
        Some(raw) => Some(
            ApplicationType::parse(raw)
                .ok_or_else(|| HandlerError::bad_request(format!("Unknown application type '{}'", raw)))?,
        ),
        None => None,
    };

    let filter = ApplicationFilter {
        status,
        app_type,
        start_date: params.start_date,
        end_date: params.end_date,
        keyword: params.keyword,
        user_id: None,
    };

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let (applications, total) = service
        .list_applications(filter, page, limit)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(ApplicationListResponse { applications, total, page, limit }))
}

// Handler: Update application status with optional comment (admin only)
pub async fn update_application_status_handler(
    State(service): State<Arc<ApplicationServiceImpl>>,
    Json(payload): Json<UpdateApplicationStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let id = parse_object_id(&payload.id, "application")?;
    let status = ApplicationStatus::parse(&payload.status)
        .ok_or_else(|| HandlerError::bad_request(format!("Unknown status '{}'", payload.status)))?;

    let updated = service
        .update_status(id, status, payload.comment)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(updated))
}

// Handler: Attach more files to an existing application (owner or admin)
pub async fn attach_application_files_handler(
    State(service): State<Arc<ApplicationServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "application")?;
    let (_, files) = read_multipart(multipart).await?;
    if files.is_empty() {
        return Err(HandlerError::bad_request("No files in request"));
    }
    let updated = service.attach_files(id, &claims, files).await.map_err(HandlerError::from)?;
    Ok(Json(updated))
}

// Handler: Soft-cancel an application (owner or admin)
pub async fn cancel_application_handler(
    State(service): State<Arc<ApplicationServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "application")?;
    let cancelled = service.cancel_application(id, &claims).await.map_err(HandlerError::from)?;
    Ok(Json(cancelled))
}

// Handler: Permanently delete a cancelled application (admin only)
pub async fn purge_application_handler(
    State(service): State<Arc<ApplicationServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_object_id(&id, "application")?;
    let result = service.purge_application(id).await.map_err(HandlerError::from)?;
    Ok(Json(result))
}
