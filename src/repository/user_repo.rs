use crate::config::mongo_conf::MongoConfig;
use crate::model::user::User;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn update(&self, id: ObjectId, user: User) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_phone(&self, phone: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    async fn list(&self, page: u32, limit: u32) -> RepositoryResult<Vec<User>>;
    async fn count(&self) -> RepositoryResult<u64>;
    async fn set_deleted(&self, id: &ObjectId, deleted: bool) -> RepositoryResult<()>;
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()>;
}

pub struct MongoUserRepository {
    collection: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let collection = crate::repository::open_collection::<User>(config, "users").await?;
        Ok(MongoUserRepository { collection })
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        match self.collection.insert_one(user.clone(), None).await {
            Ok(_) => Ok(user),
            Err(e) => {
                error!("Failed to insert user: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn update(&self, id: ObjectId, user: User) -> RepositoryResult<User> {
        let filter = doc! { "_id": id };
        let mut doc = bson::to_document(&user)
            .map_err(|e| RepositoryError::serialization(format!("Failed to serialize user: {}", e)))?;
        doc.remove("_id");
        doc.insert("updated_at", chrono::Utc::now().to_rfc3339());
        let update = doc! { "$set": doc };
        let result = self.collection.update_one(filter, update, None).await;
        match result {
            Ok(update_result) if update_result.matched_count > 0 => Ok(user),
            Ok(_) => Err(RepositoryError::not_found(format!("No user found to update for ID: {}", id))),
            Err(e) => Err(RepositoryError::database(format!("Failed to update user: {}", e))),
        }
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let filter = doc! { "email": email };
        let user = self
            .collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by email: {}", e)))?;
        Ok(user)
    }

    async fn find_by_phone(&self, phone: &str) -> RepositoryResult<Option<User>> {
        let filter = doc! { "phone": phone };
        let user = self
            .collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by phone: {}", e)))?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        let filter = doc! { "_id": id };
        let user = self
            .collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by id: {}", e)))?;
        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(page = page, limit = limit))]
    async fn list(&self, page: u32, limit: u32) -> RepositoryResult<Vec<User>> {
        let skip = (page.max(1) - 1) * limit;
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(skip as u64)
            .limit(limit as i64)
            .build();
        let mut cursor = self
            .collection
            .find(None, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list users: {}", e)))?;
        let mut users = Vec::new();
        while let Some(result) = cursor.next().await {
            users.push(result.map_err(RepositoryError::from)?);
        }
        info!("Fetched {} users", users.len());
        Ok(users)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        self.collection
            .count_documents(None, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count users: {}", e)))
    }

    async fn set_deleted(&self, id: &ObjectId, deleted: bool) -> RepositoryResult<()> {
        let update = doc! { "$set": { "is_deleted": deleted, "updated_at": chrono::Utc::now().to_rfc3339() } };
        let result = self
            .collection
            .update_one(doc! { "_id": id }, update, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to mark user deleted: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No user found for ID: {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete user: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No user found to delete for ID: {}", id)));
        }
        Ok(())
    }
}
