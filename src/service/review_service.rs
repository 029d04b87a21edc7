use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{info, instrument, warn};

use crate::dto::application_dto::PurgeResponse;
use crate::dto::review_dto::CreateReviewRequest;
use crate::model::review::{Review, ReviewStatus};
use crate::repository::review_repo::ReviewRepository;
use crate::util::error::ServiceError;
use crate::util::jwt::Claims;
use crate::util::minio::ObjectStorage;
use crate::util::store::ObservableStore;
use crate::util::upload::{BatchUploader, UploadFile, UploadPolicy};

const CACHED_PAGE: u32 = 1;
const CACHED_LIMIT: u32 = 20;

#[async_trait]
pub trait ReviewService: Send + Sync {
    async fn create_review(
        &self,
        user_id: ObjectId,
        request: CreateReviewRequest,
        images: Vec<UploadFile>,
    ) -> Result<Review, ServiceError>;
    async fn list_visible_reviews(&self, page: u32, limit: u32) -> Result<Vec<Review>, ServiceError>;
    async fn update_review_status(&self, id: ObjectId, status: ReviewStatus) -> Result<Review, ServiceError>;
    async fn soft_delete_review(&self, id: ObjectId, requester: &Claims) -> Result<Review, ServiceError>;
    async fn purge_review(&self, id: ObjectId) -> Result<PurgeResponse, ServiceError>;
}

pub struct ReviewServiceImpl {
    pub review_repo: Arc<dyn ReviewRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    uploader: BatchUploader,
    /// First page of the public listing; cleared on every mutation
    cache: ObservableStore<Vec<Review>>,
}

impl ReviewServiceImpl {
    pub fn new(review_repo: Arc<dyn ReviewRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        let uploader = BatchUploader::new(storage.clone());
        ReviewServiceImpl {
            review_repo,
            storage,
            uploader,
            cache: ObservableStore::new(),
        }
    }

    pub fn with_uploader(
        review_repo: Arc<dyn ReviewRepository>,
        storage: Arc<dyn ObjectStorage>,
        uploader: BatchUploader,
    ) -> Self {
        ReviewServiceImpl {
            review_repo,
            storage,
            uploader,
            cache: ObservableStore::new(),
        }
    }

    pub fn cache(&self) -> &ObservableStore<Vec<Review>> {
        &self.cache
    }

    fn ensure_owner_or_admin(review: &Review, requester: &Claims) -> Result<(), ServiceError> {
        if requester.is_admin() {
            return Ok(());
        }
        let requester_id = ObjectId::parse_str(&requester.sub)
            .map_err(|_| ServiceError::Forbidden("Invalid requester id".to_string()))?;
        if review.user_id != requester_id {
            return Err(ServiceError::Forbidden("Not the owner of this review".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewService for ReviewServiceImpl {
    #[instrument(skip(self, request, images), fields(user_id = %user_id, image_count = images.len()))]
    async fn create_review(
        &self,
        user_id: ObjectId,
        request: CreateReviewRequest,
        images: Vec<UploadFile>,
    ) -> Result<Review, ServiceError> {
        info!("Registering new review");

        let application_id = match request.application_id.as_deref() {
            Some(raw) => Some(
                ObjectId::parse_str(raw)
                    .map_err(|_| ServiceError::InvalidInput("Invalid application id".to_string()))?,
            ),
            None => None,
        };

        let review = Review {
            id: None,
            user_id,
            application_id,
            rating: request.rating,
            content: request.content,
            images: Vec::new(),
            status: ReviewStatus::Register,
            is_deleted: false,
            created_at: None,
            updated_at: None,
        };

        let mut inserted = self.review_repo.create(review).await.map_err(ServiceError::from)?;
        let review_id = inserted
            .id
            .ok_or_else(|| ServiceError::InternalError("Failed to get inserted review id".to_string()))?;

        if !images.is_empty() {
            let attached = self
                .uploader
                .upload_batch("reviews", &review_id, 0, &images, &UploadPolicy::review_images(), None)
                .await
                .map_err(ServiceError::from)?;
            self.review_repo
                .set_images(review_id, &attached)
                .await
                .map_err(ServiceError::from)?;
            inserted.images = attached;
        }

        self.cache.invalidate();
        info!("Review registered successfully");
        Ok(inserted)
    }

    #[instrument(skip(self), fields(page = page, limit = limit))]
    async fn list_visible_reviews(&self, page: u32, limit: u32) -> Result<Vec<Review>, ServiceError> {
        // Only the default first page goes through the cache
        if page == CACHED_PAGE && limit == CACHED_LIMIT {
            if let Some(cached) = self.cache.get() {
                info!("Serving {} reviews from cache", cached.len());
                return Ok(cached);
            }
            let reviews = self.review_repo.list_visible(page, limit).await.map_err(ServiceError::from)?;
            self.cache.set(reviews.clone());
            return Ok(reviews);
        }
        self.review_repo.list_visible(page, limit).await.map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(id = %id, status = status.as_str()))]
    async fn update_review_status(&self, id: ObjectId, status: ReviewStatus) -> Result<Review, ServiceError> {
        let updated = self.review_repo.update_status(id, status).await.map_err(ServiceError::from)?;
        self.cache.invalidate();
        Ok(updated)
    }

    #[instrument(skip(self, requester), fields(id = %id))]
    async fn soft_delete_review(&self, id: ObjectId, requester: &Claims) -> Result<Review, ServiceError> {
        let review = self.review_repo.get_by_id(id).await.map_err(ServiceError::from)?;
        Self::ensure_owner_or_admin(&review, requester)?;
        let deleted = self.review_repo.mark_deleted(id).await.map_err(ServiceError::from)?;
        self.cache.invalidate();
        Ok(deleted)
    }

    /// Hard delete. Requires the terminal soft-deleted state; stored
    /// images are removed best-effort first.
    #[instrument(skip(self), fields(id = %id))]
    async fn purge_review(&self, id: ObjectId) -> Result<PurgeResponse, ServiceError> {
        let review = self.review_repo.get_by_id(id).await.map_err(ServiceError::from)?;

        if !review.terminally_deleted() {
            warn!("Refusing to purge review in status {}", review.status.as_str());
            return Err(ServiceError::InvalidInput(
                "Review must be soft-deleted before permanent deletion".to_string(),
            ));
        }

        let keys: Vec<String> = review.images.iter().map(|img| img.filename.clone()).collect();
        let files_removed = self.uploader.remove_objects(&keys).await;
        if files_removed < keys.len() {
            warn!("Removed {}/{} image objects during purge", files_removed, keys.len());
        }

        self.review_repo.delete(id).await.map_err(ServiceError::from)?;
        self.cache.invalidate();
        info!("Review purged");
        Ok(PurgeResponse { deleted: true, files_removed })
    }
}
