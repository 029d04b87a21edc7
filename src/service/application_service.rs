use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{error, info, instrument, warn};

use crate::dto::application_dto::{ApplicationResponseDto, PurgeResponse};
use crate::model::application::{Application, ApplicationDetails, ApplicationStatus};
use crate::repository::application_repo::{ApplicationFilter, ApplicationRepository};
use crate::util::error::ServiceError;
use crate::util::jwt::Claims;
use crate::util::minio::ObjectStorage;
use crate::util::upload::{BatchUploader, UploadFile, UploadPolicy};

#[async_trait]
pub trait ApplicationService: Send + Sync {
    async fn create_application(
        &self,
        user_id: ObjectId,
        details: ApplicationDetails,
        files: Vec<UploadFile>,
    ) -> Result<Application, ServiceError>;
    async fn get_application(&self, id: ObjectId, requester: &Claims) -> Result<ApplicationResponseDto, ServiceError>;
    async fn list_applications(
        &self,
        filter: ApplicationFilter,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Application>, u64), ServiceError>;
    async fn update_status(
        &self,
        id: ObjectId,
        status: ApplicationStatus,
        comment: Option<String>,
    ) -> Result<Application, ServiceError>;
    async fn attach_files(&self, id: ObjectId, requester: &Claims, files: Vec<UploadFile>) -> Result<Application, ServiceError>;
    async fn cancel_application(&self, id: ObjectId, requester: &Claims) -> Result<Application, ServiceError>;
    async fn purge_application(&self, id: ObjectId) -> Result<PurgeResponse, ServiceError>;
}

pub struct ApplicationServiceImpl {
    pub application_repo: Arc<dyn ApplicationRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    uploader: BatchUploader,
}

impl ApplicationServiceImpl {
    pub fn new(application_repo: Arc<dyn ApplicationRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        let uploader = BatchUploader::new(storage.clone());
        ApplicationServiceImpl { application_repo, storage, uploader }
    }

    /// Constructor for tests that need custom upload pacing.
    pub fn with_uploader(
        application_repo: Arc<dyn ApplicationRepository>,
        storage: Arc<dyn ObjectStorage>,
        uploader: BatchUploader,
    ) -> Self {
        ApplicationServiceImpl { application_repo, storage, uploader }
    }

    fn ensure_owner_or_admin(application: &Application, requester: &Claims) -> Result<(), ServiceError> {
        if requester.is_admin() {
            return Ok(());
        }
        let requester_id = ObjectId::parse_str(&requester.sub)
            .map_err(|_| ServiceError::Forbidden("Invalid requester id".to_string()))?;
        if application.user_id != requester_id {
            return Err(ServiceError::Forbidden("Not the owner of this application".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ApplicationService for ApplicationServiceImpl {
    #[instrument(skip(self, details, files), fields(user_id = %user_id, file_count = files.len()))]
    async fn create_application(
        &self,
        user_id: ObjectId,
        details: ApplicationDetails,
        files: Vec<UploadFile>,
    ) -> Result<Application, ServiceError> {
        info!("Registering new {} application", details.kind().as_str());

        let application = Application {
            id: None,
            user_id,
            details,
            status: ApplicationStatus::Apply,
            admin_comment: None,
            files: Vec::new(),
            created_at: None,
            updated_at: None,
        };

        let mut inserted = self.application_repo.create(application).await.map_err(ServiceError::from)?;
        let application_id = inserted
            .id
            .ok_or_else(|| ServiceError::InternalError("Failed to get inserted application id".to_string()))?;

        if !files.is_empty() {
            let attached = self
                .uploader
                .upload_batch("applications", &application_id, 0, &files, &UploadPolicy::application_files(), None)
                .await
                .map_err(ServiceError::from)?;
            self.application_repo
                .push_files(application_id, &attached)
                .await
                .map_err(ServiceError::from)?;
            inserted.files = attached;
        }

        info!("Application registered successfully");
        Ok(inserted)
    }

    #[instrument(skip(self, requester), fields(id = %id))]
    async fn get_application(&self, id: ObjectId, requester: &Claims) -> Result<ApplicationResponseDto, ServiceError> {
        let application = self.application_repo.get_by_id(id).await.map_err(ServiceError::from)?;
        Self::ensure_owner_or_admin(&application, requester)?;

        let files = application
            .files
            .iter()
            .map(|f| self.storage.object_url(&f.filename))
            .collect();

        Ok(ApplicationResponseDto { application, files })
    }

    #[instrument(skip(self, filter), fields(page = page, limit = limit))]
    async fn list_applications(
        &self,
        filter: ApplicationFilter,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Application>, u64), ServiceError> {
        let applications = self.application_repo.list(&filter, page, limit).await.map_err(ServiceError::from)?;
        let total = self.application_repo.count(&filter).await.map_err(ServiceError::from)?;
        Ok((applications, total))
    }

    #[instrument(skip(self, comment), fields(id = %id, status = status.as_str()))]
    async fn update_status(
        &self,
        id: ObjectId,
        status: ApplicationStatus,
        comment: Option<String>,
    ) -> Result<Application, ServiceError> {
        info!("Updating application status");
        let res = self.application_repo.update_status(id, status, comment.as_deref()).await;
        match &res {
            Ok(_) => info!("Application status updated successfully"),
            Err(e) => error!("Failed to update application status: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self, requester, files), fields(id = %id, file_count = files.len()))]
    async fn attach_files(&self, id: ObjectId, requester: &Claims, files: Vec<UploadFile>) -> Result<Application, ServiceError> {
        let application = self.application_repo.get_by_id(id).await.map_err(ServiceError::from)?;
        Self::ensure_owner_or_admin(&application, requester)?;

        let attached = self
            .uploader
            .upload_batch(
                "applications",
                &id,
                application.files.len(),
                &files,
                &UploadPolicy::application_files(),
                None,
            )
            .await
            .map_err(ServiceError::from)?;

        self.application_repo.push_files(id, &attached).await.map_err(ServiceError::from)?;
        self.application_repo.get_by_id(id).await.map_err(ServiceError::from)
    }

    #[instrument(skip(self, requester), fields(id = %id))]
    async fn cancel_application(&self, id: ObjectId, requester: &Claims) -> Result<Application, ServiceError> {
        let application = self.application_repo.get_by_id(id).await.map_err(ServiceError::from)?;
        Self::ensure_owner_or_admin(&application, requester)?;
        info!("Cancelling application");
        self.application_repo
            .update_status(id, ApplicationStatus::Cancelled, None)
            .await
            .map_err(ServiceError::from)
    }

    /// Hard delete. Only a cancelled application may be purged; its
    /// stored attachments are removed best-effort first.
    #[instrument(skip(self), fields(id = %id))]
    async fn purge_application(&self, id: ObjectId) -> Result<PurgeResponse, ServiceError> {
        let application = self.application_repo.get_by_id(id).await.map_err(ServiceError::from)?;

        if !application.status.is_terminal() {
            warn!("Refusing to purge application in status {}", application.status.as_str());
            return Err(ServiceError::InvalidInput(
                "Application must be cancelled before permanent deletion".to_string(),
            ));
        }

        let keys: Vec<String> = application.files.iter().map(|f| f.filename.clone()).collect();
        let files_removed = self.uploader.remove_objects(&keys).await;
        if files_removed < keys.len() {
            warn!("Removed {}/{} attachment objects during purge", files_removed, keys.len());
        }

        self.application_repo.delete(id).await.map_err(ServiceError::from)?;
        info!("Application purged");
        Ok(PurgeResponse { deleted: true, files_removed })
    }
}
