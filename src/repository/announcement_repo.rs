use crate::config::mongo_conf::MongoConfig;
use crate::model::announcement::QuoteAnnouncement;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::doc;
use mongodb::options::UpdateOptions;
use tracing::info;

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn get_by_kind(&self, kind: &str) -> RepositoryResult<Option<QuoteAnnouncement>>;
    async fn upsert(&self, kind: &str, content: &str) -> RepositoryResult<QuoteAnnouncement>;
}

pub struct MongoAnnouncementRepository {
    collection: mongodb::Collection<QuoteAnnouncement>,
}

impl MongoAnnouncementRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let collection = crate::repository::open_collection::<QuoteAnnouncement>(config, "announcements").await?;
        Ok(MongoAnnouncementRepository { collection })
    }
}

#[async_trait]
impl AnnouncementRepository for MongoAnnouncementRepository {
    async fn get_by_kind(&self, kind: &str) -> RepositoryResult<Option<QuoteAnnouncement>> {
        self.collection
            .find_one(doc! { "kind": kind }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch announcement: {}", e)))
    }

    /// One document per kind; replaced in place.
    #[tracing::instrument(skip(self, content), fields(kind = %kind))]
    async fn upsert(&self, kind: &str, content: &str) -> RepositoryResult<QuoteAnnouncement> {
        let now = chrono::Utc::now().to_rfc3339();
        let update = doc! { "$set": { "kind": kind, "content": content, "updated_at": now } };
        let options = UpdateOptions::builder().upsert(true).build();
        self.collection
            .update_one(doc! { "kind": kind }, update, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to upsert announcement: {}", e)))?;
        info!("Announcement '{}' upserted", kind);
        self.get_by_kind(kind)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Announcement '{}' missing after upsert", kind)))
    }
}
