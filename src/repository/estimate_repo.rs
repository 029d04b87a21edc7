use crate::config::mongo_conf::MongoConfig;
use crate::model::estimate::Estimate;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info};

/// Which field the free-text keyword matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EstimateSearchField {
    #[default]
    Customer,
    Phone,
    Product,
}

impl EstimateSearchField {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "customer" => Some(EstimateSearchField::Customer),
            "phone" => Some(EstimateSearchField::Phone),
            "product" => Some(EstimateSearchField::Product),
            _ => None,
        }
    }

    fn document_path(&self) -> &'static str {
        match self {
            EstimateSearchField::Customer => "customer_name",
            EstimateSearchField::Phone => "phone",
            EstimateSearchField::Product => "items.product_name",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EstimateSearchFilter {
    pub keyword: Option<String>,
    pub search_field: EstimateSearchField,
    pub estimate_type: Option<String>,
    pub contractor_status: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl EstimateSearchFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();

        if let Some(ref estimate_type) = self.estimate_type {
            filter.insert("estimate_type", estimate_type.clone());
        }
        if let Some(contractor_status) = self.contractor_status {
            filter.insert("contractor_status", contractor_status);
        }

        let mut created_range = Document::new();
        if let Some(ref start) = self.start_date {
            created_range.insert("$gte", start.clone());
        }
        if let Some(ref end) = self.end_date {
            created_range.insert("$lte", end.clone());
        }
        if !created_range.is_empty() {
            filter.insert("created_at", created_range);
        }

        if let Some(ref keyword) = self.keyword {
            if !keyword.is_empty() {
                filter.insert(
                    self.search_field.document_path(),
                    bson::Regex {
                        pattern: regex::escape(keyword),
                        options: "i".to_string(),
                    },
                );
            }
        }

        filter
    }
}

#[async_trait]
pub trait EstimateRepository: Send + Sync {
    async fn create(&self, estimate: Estimate) -> RepositoryResult<Estimate>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Estimate>;
    async fn update(&self, id: ObjectId, estimate: Estimate) -> RepositoryResult<Estimate>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn search(&self, filter: &EstimateSearchFilter, page: u32, limit: u32) -> RepositoryResult<Vec<Estimate>>;
    async fn count(&self, filter: &EstimateSearchFilter) -> RepositoryResult<u64>;
}

pub struct MongoEstimateRepository {
    collection: mongodb::Collection<Estimate>,
}

impl MongoEstimateRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let collection = crate::repository::open_collection::<Estimate>(config, "estimates").await?;
        Ok(MongoEstimateRepository { collection })
    }
}

#[async_trait]
impl EstimateRepository for MongoEstimateRepository {
    #[tracing::instrument(skip(self, estimate))]
    async fn create(&self, estimate: Estimate) -> RepositoryResult<Estimate> {
        let mut new_estimate = estimate;
        new_estimate.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        new_estimate.created_at = Some(now.clone());
        new_estimate.updated_at = Some(now);

        match self.collection.insert_one(new_estimate.clone(), None).await {
            Ok(_) => {
                info!("Estimate created successfully");
                Ok(new_estimate)
            }
            Err(e) => {
                error!("Failed to create estimate: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Estimate> {
        match self.collection.find_one(doc! { "_id": id }, None).await {
            Ok(Some(estimate)) => Ok(estimate),
            Ok(None) => Err(RepositoryError::not_found(format!("Estimate not found for ID: {}", id))),
            Err(e) => {
                error!("Failed to fetch estimate by ID: {}", e);
                Err(RepositoryError::database(format!("Failed to fetch estimate by ID: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self, estimate), fields(id = %id))]
    async fn update(&self, id: ObjectId, estimate: Estimate) -> RepositoryResult<Estimate> {
        let mut doc = bson::to_document(&estimate)
            .map_err(|e| RepositoryError::serialization(format!("Failed to serialize estimate: {}", e)))?;
        doc.remove("_id");
        doc.insert("updated_at", chrono::Utc::now().to_rfc3339());
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": doc }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update estimate: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No estimate found to update for ID: {}", id)));
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete estimate: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No estimate found to delete for ID: {}", id)));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, filter), fields(page = page, limit = limit))]
    async fn search(&self, filter: &EstimateSearchFilter, page: u32, limit: u32) -> RepositoryResult<Vec<Estimate>> {
        let skip = (page.max(1) - 1) * limit;
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(skip as u64)
            .limit(limit as i64)
            .build();
        let mut cursor = self
            .collection
            .find(filter.to_document(), options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to search estimates: {}", e)))?;
        let mut estimates = Vec::new();
        while let Some(result) = cursor.next().await {
            estimates.push(result.map_err(RepositoryError::from)?);
        }
        info!("Fetched {} estimates", estimates.len());
        Ok(estimates)
    }

    async fn count(&self, filter: &EstimateSearchFilter) -> RepositoryResult<u64> {
        self.collection
            .count_documents(filter.to_document(), None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count estimates: {}", e)))
    }
}
