use std::collections::HashMap;

use crate::config::mongo_conf::MongoConfig;
use crate::model::attachment::AttachedFile;
use crate::model::review::{Review, ReviewStatus};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info};

/// Per-owner review statistics from the aggregation pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewStats {
    pub count: i64,
    pub average_rating: f64,
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, review: Review) -> RepositoryResult<Review>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Review>;
    async fn update_status(&self, id: ObjectId, status: ReviewStatus) -> RepositoryResult<Review>;
    async fn set_images(&self, id: ObjectId, images: &[AttachedFile]) -> RepositoryResult<()>;
    async fn mark_deleted(&self, id: ObjectId) -> RepositoryResult<Review>;
    async fn list_visible(&self, page: u32, limit: u32) -> RepositoryResult<Vec<Review>>;
    async fn find_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Vec<Review>>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn delete_by_user(&self, user_id: &ObjectId) -> RepositoryResult<u64>;
    async fn stats_by_user(&self) -> RepositoryResult<HashMap<ObjectId, ReviewStats>>;
}

pub struct MongoReviewRepository {
    collection: mongodb::Collection<Review>,
}

impl MongoReviewRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let collection = crate::repository::open_collection::<Review>(config, "reviews").await?;
        Ok(MongoReviewRepository { collection })
    }
}

#[async_trait]
impl ReviewRepository for MongoReviewRepository {
    #[tracing::instrument(skip(self, review))]
    async fn create(&self, review: Review) -> RepositoryResult<Review> {
        let mut new_review = review;
        new_review.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        new_review.created_at = Some(now.clone());
        new_review.updated_at = Some(now);

        match self.collection.insert_one(new_review.clone(), None).await {
            Ok(_) => {
                info!("Review created successfully");
                Ok(new_review)
            }
            Err(e) => {
                error!("Failed to create review: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Review> {
        match self.collection.find_one(doc! { "_id": id }, None).await {
            Ok(Some(review)) => Ok(review),
            Ok(None) => Err(RepositoryError::not_found(format!("Review not found for ID: {}", id))),
            Err(e) => {
                error!("Failed to fetch review by ID: {}", e);
                Err(RepositoryError::database(format!("Failed to fetch review by ID: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id, status = status.as_str()))]
    async fn update_status(&self, id: ObjectId, status: ReviewStatus) -> RepositoryResult<Review> {
        let update = doc! { "$set": {
            "status": status.as_str(),
            "updated_at": chrono::Utc::now().to_rfc3339(),
        } };
        let result = self
            .collection
            .update_one(doc! { "_id": id }, update, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update review status: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No review found for ID: {}", id)));
        }
        self.get_by_id(id).await
    }

    async fn set_images(&self, id: ObjectId, images: &[AttachedFile]) -> RepositoryResult<()> {
        let docs: Vec<bson::Document> = images
            .iter()
            .map(bson::to_document)
            .collect::<Result<_, _>>()
            .map_err(|e| RepositoryError::serialization(format!("Failed to serialize images: {}", e)))?;
        let update = doc! { "$set": {
            "images": docs,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        } };
        let result = self
            .collection
            .update_one(doc! { "_id": id }, update, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to set review images: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No review found for ID: {}", id)));
        }
        Ok(())
    }

    /// Soft delete: flips the flag and moves the status to `deleted`.
    async fn mark_deleted(&self, id: ObjectId) -> RepositoryResult<Review> {
        let update = doc! { "$set": {
            "is_deleted": true,
            "status": ReviewStatus::Deleted.as_str(),
            "updated_at": chrono::Utc::now().to_rfc3339(),
        } };
        let result = self
            .collection
            .update_one(doc! { "_id": id }, update, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to mark review deleted: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No review found for ID: {}", id)));
        }
        self.get_by_id(id).await
    }

    #[tracing::instrument(skip(self), fields(page = page, limit = limit))]
    async fn list_visible(&self, page: u32, limit: u32) -> RepositoryResult<Vec<Review>> {
        let skip = (page.max(1) - 1) * limit;
        let filter = doc! { "status": ReviewStatus::Active.as_str(), "is_deleted": false };
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(skip as u64)
            .limit(limit as i64)
            .build();
        let mut cursor = self
            .collection
            .find(filter, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list reviews: {}", e)))?;
        let mut reviews = Vec::new();
        while let Some(result) = cursor.next().await {
            reviews.push(result.map_err(RepositoryError::from)?);
        }
        info!("Fetched {} visible reviews", reviews.len());
        Ok(reviews)
    }

    async fn find_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Vec<Review>> {
        let mut cursor = self
            .collection
            .find(doc! { "user_id": user_id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch user reviews: {}", e)))?;
        let mut reviews = Vec::new();
        while let Some(result) = cursor.next().await {
            reviews.push(result.map_err(RepositoryError::from)?);
        }
        Ok(reviews)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete review: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No review found to delete for ID: {}", id)));
        }
        Ok(())
    }

    async fn delete_by_user(&self, user_id: &ObjectId) -> RepositoryResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "user_id": user_id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete user reviews: {}", e)))?;
        Ok(result.deleted_count)
    }

    /// Per-owner review count and average rating, soft-deleted excluded.
    async fn stats_by_user(&self) -> RepositoryResult<HashMap<ObjectId, ReviewStats>> {
        let pipeline = vec![
            doc! { "$match": { "is_deleted": false } },
            doc! { "$group": {
                "_id": "$user_id",
                "count": { "$sum": 1 },
                "average_rating": { "$avg": "$rating" },
            } },
        ];
        let mut cursor = self
            .collection
            .aggregate(pipeline, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to aggregate review stats: {}", e)))?;

        let mut stats = HashMap::new();
        while let Some(result) = cursor.next().await {
            let doc = result.map_err(RepositoryError::from)?;
            let user_id = doc
                .get_object_id("_id")
                .map_err(|e| RepositoryError::serialization(format!("Bad aggregation id: {}", e)))?;
            let count = doc
                .get_i64("count")
                .or_else(|_| doc.get_i32("count").map(i64::from))
                .map_err(|e| RepositoryError::serialization(format!("Bad aggregation count: {}", e)))?;
            let average_rating = doc.get_f64("average_rating").unwrap_or(0.0);
            stats.insert(user_id, ReviewStats { count, average_rating });
        }
        Ok(stats)
    }
}
