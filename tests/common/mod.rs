//! In-memory doubles for the repository and storage seams.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bytes::Bytes;

use comdoctor_backend::model::application::{Application, ApplicationStatus};
use comdoctor_backend::model::attachment::AttachedFile;
use comdoctor_backend::model::review::{Review, ReviewStatus};
use comdoctor_backend::model::user::User;
use comdoctor_backend::repository::application_repo::{ApplicationFilter, ApplicationRepository};
use comdoctor_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use comdoctor_backend::repository::review_repo::{ReviewRepository, ReviewStats};
use comdoctor_backend::repository::user_repo::UserRepository;
use comdoctor_backend::util::jwt::Claims;
use comdoctor_backend::util::minio::{MinioError, ObjectStorage};

// ---------------------------------------------------------------------------
// Storage double with a call log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Put(String),
    Remove(String),
}

#[derive(Default)]
pub struct MockStorage {
    pub calls: Mutex<Vec<StorageCall>>,
    /// 1-based index of the put that should fail
    pub fail_on_put: Option<usize>,
    pub fail_removes: bool,
    put_count: Mutex<usize>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on_put(n: usize) -> Self {
        MockStorage { fail_on_put: Some(n), ..Self::default() }
    }

    pub fn failing_everywhere(put_n: usize) -> Self {
        MockStorage {
            fail_on_put: Some(put_n),
            fail_removes: true,
            ..Self::default()
        }
    }

    pub fn with_failing_removes() -> Self {
        MockStorage { fail_removes: true, ..Self::default() }
    }

    pub fn call_log(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stored_keys(&self) -> Vec<String> {
        self.call_log()
            .into_iter()
            .filter_map(|c| match c {
                StorageCall::Put(key) => Some(key),
                StorageCall::Remove(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn put_object(&self, object_name: &str, _data: Vec<u8>, _content_type: Option<&str>) -> Result<(), MinioError> {
        let mut count = self.put_count.lock().unwrap();
        *count += 1;
        let attempt = *count;
        drop(count);
        self.calls.lock().unwrap().push(StorageCall::Put(object_name.to_string()));
        if self.fail_on_put == Some(attempt) {
            return Err(MinioError::OperationError("injected upload failure".to_string()));
        }
        Ok(())
    }

    async fn get_object(&self, _object_name: &str) -> Result<Bytes, MinioError> {
        Ok(Bytes::new())
    }

    async fn remove_object(&self, object_name: &str) -> Result<(), MinioError> {
        self.calls.lock().unwrap().push(StorageCall::Remove(object_name.to_string()));
        if self.fail_removes {
            return Err(MinioError::OperationError("injected delete failure".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Repository doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<Vec<User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        InMemoryUserRepo { users: Mutex::new(users) }
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepo {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: ObjectId, user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == Some(id)) {
            Some(slot) => {
                *slot = user.clone();
                Ok(user)
            }
            None => Err(RepositoryError::not_found(format!("No user found to update for ID: {}", id))),
        }
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.phone == phone).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id.as_ref() == Some(id)).cloned())
    }

    async fn list(&self, page: u32, limit: u32) -> RepositoryResult<Vec<User>> {
        let users = self.users.lock().unwrap();
        let skip = ((page.max(1) - 1) * limit) as usize;
        Ok(users.iter().skip(skip).take(limit as usize).cloned().collect())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.users.lock().unwrap().len() as u64)
    }

    async fn set_deleted(&self, id: &ObjectId, deleted: bool) -> RepositoryResult<()> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id.as_ref() == Some(id)) {
            Some(user) => {
                user.is_deleted = deleted;
                Ok(())
            }
            None => Err(RepositoryError::not_found(format!("No user found for ID: {}", id))),
        }
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id.as_ref() != Some(id));
        if users.len() == before {
            return Err(RepositoryError::not_found(format!("No user found to delete for ID: {}", id)));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryApplicationRepo {
    pub applications: Mutex<Vec<Application>>,
}

impl InMemoryApplicationRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_applications(applications: Vec<Application>) -> Self {
        InMemoryApplicationRepo { applications: Mutex::new(applications) }
    }

    pub fn len(&self) -> usize {
        self.applications.lock().unwrap().len()
    }

    pub fn get(&self, id: &ObjectId) -> Option<Application> {
        self.applications.lock().unwrap().iter().find(|a| a.id.as_ref() == Some(id)).cloned()
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepo {
    async fn create(&self, mut application: Application) -> RepositoryResult<Application> {
        application.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        application.created_at = Some(now.clone());
        application.updated_at = Some(now);
        self.applications.lock().unwrap().push(application.clone());
        Ok(application)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Application> {
        self.applications
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Application not found for ID: {}", id)))
    }

    async fn update_status(
        &self,
        id: ObjectId,
        status: ApplicationStatus,
        comment: Option<&str>,
    ) -> RepositoryResult<Application> {
        let mut applications = self.applications.lock().unwrap();
        match applications.iter_mut().find(|a| a.id == Some(id)) {
            Some(application) => {
                application.status = status;
                if let Some(comment) = comment {
                    application.admin_comment = Some(comment.to_string());
                }
                Ok(application.clone())
            }
            None => Err(RepositoryError::not_found(format!("No application found for ID: {}", id))),
        }
    }

    async fn push_files(&self, id: ObjectId, files: &[AttachedFile]) -> RepositoryResult<()> {
        let mut applications = self.applications.lock().unwrap();
        match applications.iter_mut().find(|a| a.id == Some(id)) {
            Some(application) => {
                application.files.extend_from_slice(files);
                Ok(())
            }
            None => Err(RepositoryError::not_found(format!("No application found for ID: {}", id))),
        }
    }

    async fn list(&self, _filter: &ApplicationFilter, page: u32, limit: u32) -> RepositoryResult<Vec<Application>> {
        let applications = self.applications.lock().unwrap();
        let skip = ((page.max(1) - 1) * limit) as usize;
        Ok(applications.iter().skip(skip).take(limit as usize).cloned().collect())
    }

    async fn count(&self, _filter: &ApplicationFilter) -> RepositoryResult<u64> {
        Ok(self.applications.lock().unwrap().len() as u64)
    }

    async fn find_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Vec<Application>> {
        Ok(self
            .applications
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut applications = self.applications.lock().unwrap();
        let before = applications.len();
        applications.retain(|a| a.id != Some(id));
        if applications.len() == before {
            return Err(RepositoryError::not_found(format!("No application found to delete for ID: {}", id)));
        }
        Ok(())
    }

    async fn delete_by_user(&self, user_id: &ObjectId) -> RepositoryResult<u64> {
        let mut applications = self.applications.lock().unwrap();
        let before = applications.len();
        applications.retain(|a| a.user_id != *user_id);
        Ok((before - applications.len()) as u64)
    }

    async fn count_by_user(&self) -> RepositoryResult<HashMap<ObjectId, i64>> {
        let mut counts = HashMap::new();
        for application in self.applications.lock().unwrap().iter() {
            *counts.entry(application.user_id).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[derive(Default)]
pub struct InMemoryReviewRepo {
    pub reviews: Mutex<Vec<Review>>,
}

impl InMemoryReviewRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reviews(reviews: Vec<Review>) -> Self {
        InMemoryReviewRepo { reviews: Mutex::new(reviews) }
    }

    pub fn len(&self) -> usize {
        self.reviews.lock().unwrap().len()
    }

    pub fn get(&self, id: &ObjectId) -> Option<Review> {
        self.reviews.lock().unwrap().iter().find(|r| r.id.as_ref() == Some(id)).cloned()
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepo {
    async fn create(&self, mut review: Review) -> RepositoryResult<Review> {
        review.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        review.created_at = Some(now.clone());
        review.updated_at = Some(now);
        self.reviews.lock().unwrap().push(review.clone());
        Ok(review)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Review> {
        self.reviews
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Review not found for ID: {}", id)))
    }

    async fn update_status(&self, id: ObjectId, status: ReviewStatus) -> RepositoryResult<Review> {
        let mut reviews = self.reviews.lock().unwrap();
        match reviews.iter_mut().find(|r| r.id == Some(id)) {
            Some(review) => {
                review.status = status;
                Ok(review.clone())
            }
            None => Err(RepositoryError::not_found(format!("No review found for ID: {}", id))),
        }
    }

    async fn set_images(&self, id: ObjectId, images: &[AttachedFile]) -> RepositoryResult<()> {
        let mut reviews = self.reviews.lock().unwrap();
        match reviews.iter_mut().find(|r| r.id == Some(id)) {
            Some(review) => {
                review.images = images.to_vec();
                Ok(())
            }
            None => Err(RepositoryError::not_found(format!("No review found for ID: {}", id))),
        }
    }

    async fn mark_deleted(&self, id: ObjectId) -> RepositoryResult<Review> {
        let mut reviews = self.reviews.lock().unwrap();
        match reviews.iter_mut().find(|r| r.id == Some(id)) {
            Some(review) => {
                review.is_deleted = true;
                review.status = ReviewStatus::Deleted;
                Ok(review.clone())
            }
            None => Err(RepositoryError::not_found(format!("No review found for ID: {}", id))),
        }
    }

    async fn list_visible(&self, page: u32, limit: u32) -> RepositoryResult<Vec<Review>> {
        let reviews = self.reviews.lock().unwrap();
        let skip = ((page.max(1) - 1) * limit) as usize;
        Ok(reviews
            .iter()
            .filter(|r| r.is_visible())
            .skip(skip)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_by_user(&self, user_id: &ObjectId) -> RepositoryResult<Vec<Review>> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut reviews = self.reviews.lock().unwrap();
        let before = reviews.len();
        reviews.retain(|r| r.id != Some(id));
        if reviews.len() == before {
            return Err(RepositoryError::not_found(format!("No review found to delete for ID: {}", id)));
        }
        Ok(())
    }

    async fn delete_by_user(&self, user_id: &ObjectId) -> RepositoryResult<u64> {
        let mut reviews = self.reviews.lock().unwrap();
        let before = reviews.len();
        reviews.retain(|r| r.user_id != *user_id);
        Ok((before - reviews.len()) as u64)
    }

    async fn stats_by_user(&self) -> RepositoryResult<HashMap<ObjectId, ReviewStats>> {
        let mut grouped: HashMap<ObjectId, (i64, i64)> = HashMap::new();
        for review in self.reviews.lock().unwrap().iter().filter(|r| !r.is_deleted) {
            let entry = grouped.entry(review.user_id).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += review.rating as i64;
        }
        Ok(grouped
            .into_iter()
            .map(|(user_id, (count, rating_sum))| {
                (user_id, ReviewStats { count, average_rating: rating_sum as f64 / count as f64 })
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn admin_claims() -> Claims {
    Claims {
        sub: ObjectId::new().to_string(),
        email: "admin@comdoctor.test".to_string(),
        authority: "king".to_string(),
        iat: 0,
        exp: i64::MAX,
        token_type: "access".to_string(),
        jti: "test".to_string(),
    }
}

pub fn user_claims(user_id: &ObjectId) -> Claims {
    Claims {
        sub: user_id.to_string(),
        email: "user@comdoctor.test".to_string(),
        authority: "user".to_string(),
        iat: 0,
        exp: i64::MAX,
        token_type: "access".to_string(),
        jti: "test".to_string(),
    }
}

pub fn attached_file(key: &str) -> AttachedFile {
    AttachedFile {
        url: key.to_string(),
        filename: key.to_string(),
        original_name: key.rsplit('/').next().unwrap_or(key).to_string(),
        mime_type: "application/octet-stream".to_string(),
        size: 128,
        uploaded_at: chrono::Utc::now().to_rfc3339(),
    }
}
