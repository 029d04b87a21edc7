//! Sequential attachment upload with compensation.
//!
//! Files go to object storage one at a time. When an upload fails partway
//! through a batch, every object already stored for that batch is deleted
//! again (best effort) before the error reaches the caller, so a record
//! never references half a batch.

use std::sync::Arc;
use std::time::Duration;

use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::model::attachment::AttachedFile;
use crate::util::minio::{MinioError, ObjectStorage};

/// Hard cap on attachments per record, existing ones included.
pub const MAX_FILES_PER_RECORD: usize = 5;

pub const MAX_REVIEW_IMAGE_SIZE: usize = 10 * 1024 * 1024;
pub const MAX_APPLICATION_FILE_SIZE: usize = 50 * 1024 * 1024;

const REVIEW_IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png"];

// Pacing against storage-provider rate limits
const INTER_FILE_DELAY: Duration = Duration::from_millis(200);
const ROLLBACK_BATCH_SIZE: usize = 3;
const ROLLBACK_BATCH_DELAY: Duration = Duration::from_millis(500);

/// Per-resource upload constraints, checked before anything is stored.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_files_per_record: usize,
    pub max_file_size: usize,
    /// None accepts any content type
    pub allowed_mime_types: Option<&'static [&'static str]>,
}

impl UploadPolicy {
    /// Review images: small, JPEG/PNG only.
    pub fn review_images() -> Self {
        UploadPolicy {
            max_files_per_record: MAX_FILES_PER_RECORD,
            max_file_size: MAX_REVIEW_IMAGE_SIZE,
            allowed_mime_types: Some(REVIEW_IMAGE_MIME_TYPES),
        }
    }

    /// Application attachments: any type, larger ceiling.
    pub fn application_files() -> Self {
        UploadPolicy {
            max_files_per_record: MAX_FILES_PER_RECORD,
            max_file_size: MAX_APPLICATION_FILE_SIZE,
            allowed_mime_types: None,
        }
    }
}

/// One in-memory file taken from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Uploading,
    Done,
}

#[derive(Debug, Clone)]
pub struct UploadProgress {
    pub current: usize,
    pub total: usize,
    pub file_name: String,
    pub status: UploadStatus,
}

pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Attachment limit exceeded: {existing} existing + {incoming} new files, limit is {limit}")]
    TooManyFiles { existing: usize, incoming: usize, limit: usize },

    #[error("File '{file_name}' is {size} bytes, limit is {limit}")]
    FileTooLarge { file_name: String, size: usize, limit: usize },

    #[error("File '{file_name}' has unsupported content type '{content_type}'")]
    UnsupportedContentType { file_name: String, content_type: String },

    #[error(transparent)]
    Storage(#[from] MinioError),
}

pub struct BatchUploader {
    storage: Arc<dyn ObjectStorage>,
    inter_file_delay: Duration,
    rollback_batch_size: usize,
    rollback_batch_delay: Duration,
}

impl BatchUploader {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        BatchUploader {
            storage,
            inter_file_delay: INTER_FILE_DELAY,
            rollback_batch_size: ROLLBACK_BATCH_SIZE,
            rollback_batch_delay: ROLLBACK_BATCH_DELAY,
        }
    }

    /// Override the pacing delays (tests run with zero delays).
    pub fn with_pacing(
        storage: Arc<dyn ObjectStorage>,
        inter_file_delay: Duration,
        rollback_batch_size: usize,
        rollback_batch_delay: Duration,
    ) -> Self {
        BatchUploader {
            storage,
            inter_file_delay,
            rollback_batch_size: rollback_batch_size.max(1),
            rollback_batch_delay,
        }
    }

    /// Upload a batch of files for one owning record.
    ///
    /// Policy checks run before the first byte is stored. Uploads are
    /// strictly sequential; on failure every already-stored object of
    /// this batch is compensated before the error is returned.
    pub async fn upload_batch(
        &self,
        resource: &str,
        owner_id: &ObjectId,
        existing_count: usize,
        files: &[UploadFile],
        policy: &UploadPolicy,
        progress: Option<&ProgressCallback>,
    ) -> Result<Vec<AttachedFile>, UploadError> {
        if existing_count + files.len() > policy.max_files_per_record {
            return Err(UploadError::TooManyFiles {
                existing: existing_count,
                incoming: files.len(),
                limit: policy.max_files_per_record,
            });
        }

        for file in files {
            if file.size > policy.max_file_size {
                return Err(UploadError::FileTooLarge {
                    file_name: file.filename.clone(),
                    size: file.size,
                    limit: policy.max_file_size,
                });
            }
            if let Some(allowed) = policy.allowed_mime_types {
                if !allowed.contains(&file.content_type.as_str()) {
                    return Err(UploadError::UnsupportedContentType {
                        file_name: file.filename.clone(),
                        content_type: file.content_type.clone(),
                    });
                }
            }
        }

        let total = files.len();
        let timestamp = Utc::now().timestamp_millis();
        // Keys of objects stored so far; popped in reverse on failure
        let mut applied: Vec<String> = Vec::with_capacity(total);
        let mut attached: Vec<AttachedFile> = Vec::with_capacity(total);

        for (index, file) in files.iter().enumerate() {
            if let Some(cb) = progress {
                cb(UploadProgress {
                    current: index + 1,
                    total,
                    file_name: file.filename.clone(),
                    status: UploadStatus::Uploading,
                });
            }

            let object_key = object_key(resource, owner_id, timestamp, index, &file.filename);

            if let Err(e) = self
                .storage
                .put_object(&object_key, file.content.clone(), Some(&file.content_type))
                .await
            {
                warn!(
                    "Upload of '{}' failed after {} stored objects, rolling back batch",
                    file.filename,
                    applied.len()
                );
                self.rollback(&mut applied).await;
                return Err(UploadError::Storage(e));
            }

            applied.push(object_key.clone());
            attached.push(AttachedFile {
                url: self.storage.object_url(&object_key),
                filename: object_key,
                original_name: file.filename.clone(),
                mime_type: file.content_type.clone(),
                size: file.size,
                uploaded_at: Utc::now().to_rfc3339(),
            });

            if let Some(cb) = progress {
                cb(UploadProgress {
                    current: index + 1,
                    total,
                    file_name: file.filename.clone(),
                    status: UploadStatus::Done,
                });
            }

            if index + 1 < total && !self.inter_file_delay.is_zero() {
                tokio::time::sleep(self.inter_file_delay).await;
            }
        }

        info!("Uploaded {} files for {}/{}", total, resource, owner_id);
        Ok(attached)
    }

    /// Best-effort compensation: delete stored objects in reverse order,
    /// in bounded batches. Deletion failures are logged and swallowed.
    async fn rollback(&self, applied: &mut Vec<String>) {
        let mut deleted_in_batch = 0;
        while let Some(object_key) = applied.pop() {
            if deleted_in_batch == self.rollback_batch_size {
                deleted_in_batch = 0;
                if !self.rollback_batch_delay.is_zero() {
                    tokio::time::sleep(self.rollback_batch_delay).await;
                }
            }
            match self.storage.remove_object(&object_key).await {
                Ok(()) => debug!("Rolled back object '{}'", object_key),
                Err(e) => warn!("Failed to roll back object '{}': {}", object_key, e),
            }
            deleted_in_batch += 1;
        }
    }

    /// Delete a set of stored objects (cascade cleanup). Failures are
    /// logged and skipped; returns the number of successful deletions.
    pub async fn remove_objects(&self, object_keys: &[String]) -> usize {
        let mut removed = 0;
        for (i, object_key) in object_keys.iter().enumerate() {
            if i > 0 && i % self.rollback_batch_size == 0 && !self.rollback_batch_delay.is_zero() {
                tokio::time::sleep(self.rollback_batch_delay).await;
            }
            match self.storage.remove_object(object_key).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to delete object '{}': {}", object_key, e),
            }
        }
        removed
    }
}

fn object_key(resource: &str, owner_id: &ObjectId, timestamp: i64, index: usize, original_name: &str) -> String {
    format!("{}/{}/{}_{}_{}", resource, owner_id, timestamp, index, original_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_layout() {
        let owner = ObjectId::parse_str("64b000000000000000000001").unwrap();
        let key = object_key("reviews", &owner, 1700000000000, 2, "photo.png");
        assert_eq!(key, "reviews/64b000000000000000000001/1700000000000_2_photo.png");
    }

    #[test]
    fn test_review_policy_limits() {
        let policy = UploadPolicy::review_images();
        assert_eq!(policy.max_files_per_record, 5);
        assert_eq!(policy.max_file_size, 10 * 1024 * 1024);
        assert!(policy.allowed_mime_types.unwrap().contains(&"image/png"));
    }

    #[test]
    fn test_application_policy_accepts_any_type() {
        let policy = UploadPolicy::application_files();
        assert_eq!(policy.max_file_size, 50 * 1024 * 1024);
        assert!(policy.allowed_mime_types.is_none());
    }
}
