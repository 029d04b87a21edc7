use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{error, info, instrument, warn};

use crate::dto::user_dto::{CascadeSummary, UserSummary, UserWithStats};
use crate::model::user::{Authority, User};
use crate::repository::application_repo::ApplicationRepository;
use crate::repository::review_repo::ReviewRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::jwt::{Claims, JwtTokenUtils, JwtTokenUtilsImpl};
use crate::util::minio::ObjectStorage;
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::upload::BatchUploader;

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct UserAuthResponse {
    pub user: UserSummary,
    pub tokens: AuthTokens,
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, user: User, password: String) -> Result<UserAuthResponse, ServiceError>;
    async fn login(&self, email: String, password: String) -> Result<UserAuthResponse, ServiceError>;
    async fn refresh_token(&self, refresh_token: String) -> Result<AuthTokens, ServiceError>;
    async fn list_users_with_stats(&self, page: u32, limit: u32) -> Result<(Vec<UserWithStats>, u64), ServiceError>;
    async fn soft_delete_user(&self, id: ObjectId, requester: &Claims) -> Result<(), ServiceError>;
    async fn purge_user(&self, id: ObjectId) -> Result<CascadeSummary, ServiceError>;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub application_repo: Arc<dyn ApplicationRepository>,
    pub review_repo: Arc<dyn ReviewRepository>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    uploader: BatchUploader,
}

impl UserServiceImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        application_repo: Arc<dyn ApplicationRepository>,
        review_repo: Arc<dyn ReviewRepository>,
        jwt_utils: Arc<JwtTokenUtilsImpl>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let uploader = BatchUploader::new(storage);
        UserServiceImpl { user_repo, application_repo, review_repo, jwt_utils, uploader }
    }

    pub fn with_uploader(
        user_repo: Arc<dyn UserRepository>,
        application_repo: Arc<dyn ApplicationRepository>,
        review_repo: Arc<dyn ReviewRepository>,
        jwt_utils: Arc<JwtTokenUtilsImpl>,
        uploader: BatchUploader,
    ) -> Self {
        UserServiceImpl { user_repo, application_repo, review_repo, jwt_utils, uploader }
    }

    fn auth_response(&self, user: User) -> Result<UserAuthResponse, ServiceError> {
        let tokens = self
            .jwt_utils
            .generate_token_pair(
                &user.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
                &user.email,
                user.authority.as_str(),
            )
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;
        Ok(UserAuthResponse {
            user: UserSummary::from(user),
            tokens: AuthTokens {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                expires_in: tokens.expires_in,
                token_type: tokens.token_type,
            },
        })
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, user, password), fields(username = %user.username, email = %user.email))]
    async fn register(&self, mut user: User, password: String) -> Result<UserAuthResponse, ServiceError> {
        info!("Registering new user");

        if self.user_repo.find_by_email(&user.email).await?.is_some() {
            warn!("Registration rejected: email already in use");
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }
        if self.user_repo.find_by_phone(&user.phone).await?.is_some() {
            warn!("Registration rejected: phone already in use");
            return Err(ServiceError::Conflict("Phone number already registered".to_string()));
        }

        let hash = PasswordUtilsImpl::hash_password(&password)
            .map_err(|e| ServiceError::InvalidInput(format!("Password hash error: {}", e)))?;
        user.password_hash = hash;

        let inserted = self.user_repo.insert(user).await;
        match &inserted {
            Ok(_) => info!("User inserted successfully"),
            Err(e) => error!("Failed to insert user: {e}"),
        }
        self.auth_response(inserted?)
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: String, password: String) -> Result<UserAuthResponse, ServiceError> {
        info!("User login attempt");
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(ServiceError::NotFound("User not found".to_string()))?;

        if user.is_deleted {
            warn!("Login attempt for soft-deleted account");
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        let valid = PasswordUtilsImpl::verify_password(&password, &user.password_hash)
            .map_err(|e| ServiceError::InvalidInput(format!("Password verify error: {}", e)))?;
        if !valid {
            error!("Invalid credentials for user: {}", email);
            return Err(ServiceError::InvalidInput("Invalid credentials".to_string()));
        }

        info!("User logged in successfully");
        self.auth_response(user)
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_token(&self, refresh_token: String) -> Result<AuthTokens, ServiceError> {
        info!("Refreshing token");
        let claims = self
            .jwt_utils
            .validate_refresh_token(&refresh_token)
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid refresh token: {}", e)))?;
        let tokens = self
            .jwt_utils
            .generate_token_pair(&claims.sub, &claims.email, &claims.authority)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;
        Ok(AuthTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        })
    }

    /// Admin dashboard page: the two per-owner aggregations run
    /// concurrently and are joined onto the user page by id.
    #[instrument(skip(self), fields(page = page, limit = limit))]
    async fn list_users_with_stats(&self, page: u32, limit: u32) -> Result<(Vec<UserWithStats>, u64), ServiceError> {
        let (service_counts, review_stats) =
            tokio::join!(self.application_repo.count_by_user(), self.review_repo.stats_by_user());
        let service_counts = service_counts.map_err(ServiceError::from)?;
        let review_stats = review_stats.map_err(ServiceError::from)?;

        let users = self.user_repo.list(page, limit).await.map_err(ServiceError::from)?;
        let total = self.user_repo.count().await.map_err(ServiceError::from)?;

        let rows = users
            .into_iter()
            .map(|user| {
                let id = user.id;
                let service_count = id.and_then(|id| service_counts.get(&id).copied()).unwrap_or(0);
                let (review_count, average_rating) = id
                    .and_then(|id| review_stats.get(&id).map(|s| (s.count, s.average_rating)))
                    .unwrap_or((0, 0.0));
                UserWithStats {
                    user: UserSummary::from(user),
                    service_count,
                    review_count,
                    average_rating,
                }
            })
            .collect();

        Ok((rows, total))
    }

    #[instrument(skip(self, requester), fields(id = %id))]
    async fn soft_delete_user(&self, id: ObjectId, requester: &Claims) -> Result<(), ServiceError> {
        if !requester.is_admin() && requester.sub != id.to_string() {
            return Err(ServiceError::Forbidden("Cannot delete another user's account".to_string()));
        }
        info!("Soft-deleting user");
        self.user_repo.set_deleted(&id, true).await.map_err(ServiceError::from)
    }

    /// Cascading hard delete: dependents and their blobs go first, the
    /// account record last. Storage failures are logged, never fatal.
    #[instrument(skip(self), fields(id = %id))]
    async fn purge_user(&self, id: ObjectId) -> Result<CascadeSummary, ServiceError> {
        let user = self
            .user_repo
            .find_by_id(&id)
            .await?
            .ok_or(ServiceError::NotFound("User not found".to_string()))?;

        if !user.is_deleted {
            warn!("Refusing to purge user that is not soft-deleted");
            return Err(ServiceError::InvalidInput(
                "User must be soft-deleted before permanent deletion".to_string(),
            ));
        }
        if user.authority == Authority::King {
            return Err(ServiceError::InvalidInput("Administrator accounts cannot be purged".to_string()));
        }

        let mut summary = CascadeSummary::default();

        // Applications and their attachments
        let applications = self.application_repo.find_by_user(&id).await.map_err(ServiceError::from)?;
        let application_keys: Vec<String> = applications
            .iter()
            .flat_map(|a| a.files.iter().map(|f| f.filename.clone()))
            .collect();
        summary.application_files_deleted = self.uploader.remove_objects(&application_keys).await;
        summary.applications_deleted = self.application_repo.delete_by_user(&id).await.map_err(ServiceError::from)?;

        // Reviews and their images
        let reviews = self.review_repo.find_by_user(&id).await.map_err(ServiceError::from)?;
        let review_keys: Vec<String> = reviews
            .iter()
            .flat_map(|r| r.images.iter().map(|img| img.filename.clone()))
            .collect();
        summary.review_images_deleted = self.uploader.remove_objects(&review_keys).await;
        summary.reviews_deleted = self.review_repo.delete_by_user(&id).await.map_err(ServiceError::from)?;

        // The owning record goes last
        self.user_repo.delete(&id).await.map_err(ServiceError::from)?;

        info!(
            "User purged: {} applications ({} files), {} reviews ({} images)",
            summary.applications_deleted,
            summary.application_files_deleted,
            summary.reviews_deleted,
            summary.review_images_deleted
        );
        Ok(summary)
    }
}
