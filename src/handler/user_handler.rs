use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bson::oid::ObjectId;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::dto::user_dto::{UserListQuery, UserListResponse};
use crate::model::user::{Authority, User};
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::error::{HandlerError, HandlerErrorKind};
use crate::util::format::{format_korean_phone_number, is_valid_korean_phone};
use crate::util::jwt::Claims;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 32))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 9, max = 20))]
    pub phone: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 10))]
    pub refresh_token: String,
}

// Register
pub async fn register_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError {
            error: HandlerErrorKind::BadRequest,
            message: format!("Validation error: {}", e),
            details: None,
        });
    }
    if !is_valid_korean_phone(&payload.phone) {
        return Err(HandlerError::bad_request("Invalid phone number format"));
    }

    let user = User {
        id: None,
        username: payload.username,
        email: payload.email,
        // Stored in display form so uniqueness checks normalize the same way
        phone: format_korean_phone_number(&payload.phone),
        password_hash: String::new(),
        authority: Authority::User,
        is_deleted: false,
        oauth: None,
        created_at: None,
        updated_at: None,
    };
    let res = service.register(user, payload.password).await.map_err(HandlerError::from)?;
    Ok((StatusCode::CREATED, Json(res)))
}

// Login
pub async fn login_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError {
            error: HandlerErrorKind::BadRequest,
            message: format!("Validation error: {}", e),
            details: None,
        });
    }
    let res = service.login(payload.email, payload.password).await.map_err(HandlerError::from)?;
    Ok(Json(res))
}

// Refresh Token
pub async fn refresh_token_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError {
            error: HandlerErrorKind::BadRequest,
            message: format!("Validation error: {}", e),
            details: None,
        });
    }
    let res = service.refresh_token(payload.refresh_token).await.map_err(HandlerError::from)?;
    Ok(Json(res))
}

// Handler: List users with activity stats (admin only)
pub async fn list_users_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Query(params): Query<UserListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let (users, total) = service.list_users_with_stats(page, limit).await.map_err(HandlerError::from)?;
    Ok(Json(UserListResponse { users, total, page, limit }))
}

// Handler: Soft-delete a user (self or admin)
pub async fn delete_user_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = ObjectId::parse_str(&id).map_err(|_| HandlerError::bad_request("Invalid user id"))?;
    service.soft_delete_user(id, &claims).await.map_err(HandlerError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

// Handler: Permanently delete a soft-deleted user and everything
// belonging to them (admin only)
pub async fn purge_user_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = ObjectId::parse_str(&id).map_err(|_| HandlerError::bad_request("Invalid user id"))?;
    let summary = service.purge_user(id).await.map_err(HandlerError::from)?;
    Ok(Json(summary))
}
