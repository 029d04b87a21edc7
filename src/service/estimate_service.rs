use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{error, info, instrument};

use crate::dto::estimate_dto::SaveEstimateRequest;
use crate::model::announcement::QuoteAnnouncement;
use crate::model::estimate::Estimate;
use crate::repository::announcement_repo::AnnouncementRepository;
use crate::repository::estimate_repo::{EstimateRepository, EstimateSearchFilter};
use crate::util::error::ServiceError;

#[async_trait]
pub trait EstimateService: Send + Sync {
    async fn save_estimate(&self, request: SaveEstimateRequest) -> Result<Estimate, ServiceError>;
    async fn get_estimate(&self, id: ObjectId) -> Result<Estimate, ServiceError>;
    async fn update_estimate(&self, id: ObjectId, request: SaveEstimateRequest) -> Result<Estimate, ServiceError>;
    async fn delete_estimate(&self, id: ObjectId) -> Result<(), ServiceError>;
    async fn search_estimates(
        &self,
        filter: EstimateSearchFilter,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Estimate>, u64), ServiceError>;
    async fn get_announcement(&self, kind: &str) -> Result<QuoteAnnouncement, ServiceError>;
    async fn upsert_announcement(&self, kind: &str, content: &str) -> Result<QuoteAnnouncement, ServiceError>;
}

pub struct EstimateServiceImpl {
    pub estimate_repo: Arc<dyn EstimateRepository>,
    pub announcement_repo: Arc<dyn AnnouncementRepository>,
}

impl EstimateServiceImpl {
    pub fn new(estimate_repo: Arc<dyn EstimateRepository>, announcement_repo: Arc<dyn AnnouncementRepository>) -> Self {
        EstimateServiceImpl { estimate_repo, announcement_repo }
    }

    // Totals are stored exactly as the client computed them
    fn to_model(request: SaveEstimateRequest) -> Estimate {
        Estimate {
            id: None,
            customer_name: request.customer_name,
            phone: request.phone,
            email: request.email,
            estimate_type: request.estimate_type,
            contractor_status: request.contractor_status,
            items: request.items,
            payment: request.payment,
            supply_amount: request.supply_amount,
            tax_amount: request.tax_amount,
            total_amount: request.total_amount,
            note: request.note,
            created_at: None,
            updated_at: None,
        }
    }
}

#[async_trait]
impl EstimateService for EstimateServiceImpl {
    #[instrument(skip(self, request), fields(customer = %request.customer_name))]
    async fn save_estimate(&self, request: SaveEstimateRequest) -> Result<Estimate, ServiceError> {
        info!("Saving new estimate");
        let res = self.estimate_repo.create(Self::to_model(request)).await;
        match &res {
            Ok(_) => info!("Estimate saved successfully"),
            Err(e) => error!("Failed to save estimate: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_estimate(&self, id: ObjectId) -> Result<Estimate, ServiceError> {
        self.estimate_repo.get_by_id(id).await.map_err(ServiceError::from)
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_estimate(&self, id: ObjectId, request: SaveEstimateRequest) -> Result<Estimate, ServiceError> {
        info!("Updating estimate");
        let res = self.estimate_repo.update(id, Self::to_model(request)).await;
        match &res {
            Ok(_) => info!("Estimate updated successfully"),
            Err(e) => error!("Failed to update estimate: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_estimate(&self, id: ObjectId) -> Result<(), ServiceError> {
        info!("Deleting estimate");
        self.estimate_repo.delete(id).await.map_err(ServiceError::from)
    }

    #[instrument(skip(self, filter), fields(page = page, limit = limit))]
    async fn search_estimates(
        &self,
        filter: EstimateSearchFilter,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Estimate>, u64), ServiceError> {
        let estimates = self.estimate_repo.search(&filter, page, limit).await.map_err(ServiceError::from)?;
        let total = self.estimate_repo.count(&filter).await.map_err(ServiceError::from)?;
        Ok((estimates, total))
    }

    #[instrument(skip(self), fields(kind = %kind))]
    async fn get_announcement(&self, kind: &str) -> Result<QuoteAnnouncement, ServiceError> {
        self.announcement_repo
            .get_by_kind(kind)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No announcement for kind '{}'", kind)))
    }

    #[instrument(skip(self, content), fields(kind = %kind))]
    async fn upsert_announcement(&self, kind: &str, content: &str) -> Result<QuoteAnnouncement, ServiceError> {
        if content.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Announcement content cannot be empty".to_string()));
        }
        self.announcement_repo.upsert(kind, content).await.map_err(ServiceError::from)
    }
}
