use std::collections::HashMap;

use crate::config::mongo_conf::MongoConfig;
use crate::model::application::{Application, ApplicationStatus, ApplicationType};
use crate::model::attachment::AttachedFile;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info};

/// Free-text fields the keyword filter matches against.
const KEYWORD_FIELDS: &[&str] = &[
    "details.purpose",
    "details.symptom",
    "details.printer_model",
    "details.notebook_model",
    "details.device",
    "details.title",
    "details.message",
];

/// Optional listing filters, combined into one query document.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub app_type: Option<ApplicationType>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub keyword: Option<String>,
    pub user_id: Option<ObjectId>,
}

impl ApplicationFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();

        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(app_type) = self.app_type {
            filter.insert("details.type", app_type.as_str());
        }
        if let Some(user_id) = self.user_id {
            filter.insert("user_id", user_id);
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
                let pattern = regex::escape(keyword);
                let clauses: Vec<Document> = KEYWORD_FIELDS
                    .iter()
                    .map(|field| {
                        let mut clause = Document::new();
                        clause.insert(
                            *field,
                            bson::Regex { pattern: pattern.clone(), options: "i".to_string() },
                        );
                        clause
                    })
                    .collect();
                filter.insert("$or", clauses);
            }
        }

        filter
    }
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn create(&self, application: Application) -> RepositoryResult<Application>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Application>;
    async fn update_status(&self, id: ObjectId, status: ApplicationStatus, comment: Option<&str>) -> RepositoryResult<Application>;
    async fn push_files(&self, id: ObjectId, files: &[AttachedFile]) -> RepositoryResult<()>;
    async fn list(&self, filter: &ApplicationFilter, page: u32, limit: u32) -> RepositoryResult<Vec<Application>>;
    async fn count(&self, filter: &ApplicationFilter) -> RepositoryResult<u64>;
    async fn find_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Vec<Application>>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn delete_by_user(&self, user_id: &ObjectId) -> RepositoryResult<u64>;
    async fn count_by_user(&self) -> RepositoryResult<HashMap<ObjectId, i64>>;
}

pub struct MongoApplicationRepository {
    collection: mongodb::Collection<Application>,
}

impl MongoApplicationRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let collection = crate::repository::open_collection::<Application>(config, "applications").await?;
        Ok(MongoApplicationRepository { collection })
    }
}

#[async_trait]
impl ApplicationRepository for MongoApplicationRepository {
    #[tracing::instrument(skip(self, application))]
    async fn create(&self, application: Application) -> RepositoryResult<Application> {
        let mut new_application = application;
        new_application.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        new_application.created_at = Some(now.clone());
        new_application.updated_at = Some(now);

        match self.collection.insert_one(new_application.clone(), None).await {
            Ok(_) => {
                info!("Application created successfully");
                Ok(new_application)
            }
            Err(e) => {
                error!("Failed to create application: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Application> {
        let filter = doc! { "_id": id };
        match self.collection.find_one(filter, None).await {
            Ok(Some(application)) => Ok(application),
            Ok(None) => Err(RepositoryError::not_found(format!("Application not found for ID: {}", id))),
            Err(e) => {
                error!("Failed to fetch application by ID: {}", e);
                Err(RepositoryError::database(format!("Failed to fetch application by ID: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id, status = status.as_str()))]
    async fn update_status(&self, id: ObjectId, status: ApplicationStatus, comment: Option<&str>) -> RepositoryResult<Application> {
        let mut set = doc! {
            "status": status.as_str(),
            "updated_at": chrono::Utc::now().to_rfc3339(),
        };
        if let Some(comment) = comment {
            set.insert("admin_comment", comment);
        }
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": set }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update application status: {}", e)))?;

        if result.matched_count == 0 {
            error!("No application found to update status for ID: {}", id);
            return Err(RepositoryError::not_found(format!("No application found for ID: {}", id)));
        }
        self.get_by_id(id).await
    }

    async fn push_files(&self, id: ObjectId, files: &[AttachedFile]) -> RepositoryResult<()> {
        let docs: Vec<Document> = files
            .iter()
            .map(bson::to_document)
            .collect::<Result<_, _>>()
            .map_err(|e| RepositoryError::serialization(format!("Failed to serialize attachments: {}", e)))?;
        let update = doc! {
            "$push": { "files": { "$each": docs } },
            "$set": { "updated_at": chrono::Utc::now().to_rfc3339() },
        };
        let result = self
            .collection
            .update_one(doc! { "_id": id }, update, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to attach files: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No application found for ID: {}", id)));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, filter), fields(page = page, limit = limit))]
    async fn list(&self, filter: &ApplicationFilter, page: u32, limit: u32) -> RepositoryResult<Vec<Application>> {
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
            .map_err(|e| RepositoryError::database(format!("Failed to list applications: {}", e)))?;
        let mut applications = Vec::new();
        while let Some(result) = cursor.next().await {
            applications.push(result.map_err(RepositoryError::from)?);
        }
        info!("Fetched {} applications", applications.len());
        Ok(applications)
    }

    async fn count(&self, filter: &ApplicationFilter) -> RepositoryResult<u64> {
        self.collection
            .count_documents(filter.to_document(), None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count applications: {}", e)))
    }

    async fn find_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Vec<Application>> {
        let mut cursor = self
            .collection
            .find(doc! { "user_id": user_id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch user applications: {}", e)))?;
        let mut applications = Vec::new();
        while let Some(result) = cursor.next().await {
            applications.push(result.map_err(RepositoryError::from)?);
        }
        Ok(applications)
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete application: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No application found to delete for ID: {}", id)));
        }
        Ok(())
    }

    async fn delete_by_user(&self, user_id: &ObjectId) -> RepositoryResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "user_id": user_id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete user applications: {}", e)))?;
        Ok(result.deleted_count)
    }

    /// Per-owner application counts for the admin dashboard.
    async fn count_by_user(&self) -> RepositoryResult<HashMap<ObjectId, i64>> {
        let pipeline = vec![doc! { "$group": { "_id": "$user_id", "count": { "$sum": 1 } } }];
        let mut cursor = self
            .collection
            .aggregate(pipeline, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to aggregate application counts: {}", e)))?;

        let mut counts = HashMap::new();
        while let Some(result) = cursor.next().await {
            let doc = result.map_err(RepositoryError::from)?;
            let user_id = doc
                .get_object_id("_id")
                .map_err(|e| RepositoryError::serialization(format!("Bad aggregation id: {}", e)))?;
            let count = doc
                .get_i64("count")
                .or_else(|_| doc.get_i32("count").map(i64::from))
                .map_err(|e| RepositoryError::serialization(format!("Bad aggregation count: {}", e)))?;
            counts.insert(user_id, count);
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_builds_empty_document() {
        let filter = ApplicationFilter::default();
        assert!(filter.to_document().is_empty());
    }

    #[test]
    fn test_filter_with_status_and_type() {
        let filter = ApplicationFilter {
            status: Some(ApplicationStatus::InProgress),
            app_type: Some(ApplicationType::Printer),
            ..Default::default()
        };
        let doc = filter.to_document();
        assert_eq!(doc.get_str("status").unwrap(), "in_progress");
        assert_eq!(doc.get_str("details.type").unwrap(), "printer");
    }

    #[test]
    fn test_filter_date_range() {
        let filter = ApplicationFilter {
            start_date: Some("2024-01-01T00:00:00Z".to_string()),
            end_date: Some("2024-12-31T23:59:59Z".to_string()),
            ..Default::default()
        };
        let doc = filter.to_document();
        let range = doc.get_document("created_at").unwrap();
        assert_eq!(range.get_str("$gte").unwrap(), "2024-01-01T00:00:00Z");
        assert_eq!(range.get_str("$lte").unwrap(), "2024-12-31T23:59:59Z");
    }

    #[test]
    fn test_filter_keyword_spans_fixed_fields() {
        let filter = ApplicationFilter {
            keyword: Some("samsung".to_string()),
            ..Default::default()
        };
        let doc = filter.to_document();
        let clauses = doc.get_array("$or").unwrap();
        assert_eq!(clauses.len(), KEYWORD_FIELDS.len());
    }

    #[test]
    fn test_filter_keyword_is_escaped() {
        let filter = ApplicationFilter {
            keyword: Some("a+b(c)".to_string()),
            ..Default::default()
        };
        let doc = filter.to_document();
        let clauses = doc.get_array("$or").unwrap();
        let first = clauses[0].as_document().unwrap();
        let regex = first.get("details.purpose").unwrap();
        let bson::Bson::RegularExpression(re) = regex else {
            panic!("expected a regex clause");
        };
        assert!(re.pattern.contains("\\+"));
        assert_eq!(re.options, "i");
    }
}
