mod common;

use std::sync::Arc;
use std::time::Duration;

use bson::oid::ObjectId;
use common::{admin_claims, attached_file, user_claims, InMemoryApplicationRepo, MockStorage, StorageCall};
use comdoctor_backend::model::application::{Application, ApplicationDetails, ApplicationStatus};
use comdoctor_backend::service::application_service::{ApplicationService, ApplicationServiceImpl};
use comdoctor_backend::util::error::ServiceError;
use comdoctor_backend::util::upload::{BatchUploader, UploadFile};

fn service_with(applications: Vec<Application>) -> (Arc<InMemoryApplicationRepo>, Arc<MockStorage>, ApplicationServiceImpl) {
    let repo = Arc::new(InMemoryApplicationRepo::with_applications(applications));
    let storage = Arc::new(MockStorage::new());
    let uploader = BatchUploader::with_pacing(storage.clone(), Duration::ZERO, 3, Duration::ZERO);
    let service = ApplicationServiceImpl::with_uploader(repo.clone(), storage.clone(), uploader);
    (repo, storage, service)
}

fn application(user_id: ObjectId, status: ApplicationStatus, file_keys: &[&str]) -> Application {
    Application {
        id: Some(ObjectId::new()),
        user_id,
        details: ApplicationDetails::As {
            device: "LG gram 16".to_string(),
            symptom: "will not boot".to_string(),
        },
        status,
        admin_comment: None,
        files: file_keys.iter().map(|k| attached_file(k)).collect(),
        created_at: None,
        updated_at: None,
    }
}

fn upload(name: &str) -> UploadFile {
    UploadFile {
        filename: name.to_string(),
        content_type: "application/zip".to_string(),
        content: vec![1, 2, 3],
        size: 3,
    }
}

#[tokio::test]
async fn test_create_application_starts_in_apply_status() {
    let (repo, _storage, service) = service_with(vec![]);
    let user_id = ObjectId::new();

    let created = service
        .create_application(
            user_id,
            ApplicationDetails::Inquiry {
                title: "warranty question".to_string(),
                message: "is the SSD covered?".to_string(),
            },
            vec![],
        )
        .await
        .unwrap();

    assert_eq!(created.status, ApplicationStatus::Apply);
    assert_eq!(created.user_id, user_id);
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn test_create_application_uploads_and_records_files() {
    let (repo, storage, service) = service_with(vec![]);
    let user_id = ObjectId::new();

    let created = service
        .create_application(
            user_id,
            ApplicationDetails::Computer {
                purpose: "office work".to_string(),
                budget: None,
                parts_request: None,
            },
            vec![upload("diag.zip"), upload("photo.jpg")],
        )
        .await
        .unwrap();

    assert_eq!(created.files.len(), 2);
    assert_eq!(storage.stored_keys().len(), 2);
    let stored = repo.get(&created.id.unwrap()).unwrap();
    assert_eq!(stored.files.len(), 2);
}

#[tokio::test]
async fn test_get_application_denies_strangers() {
    let owner = ObjectId::new();
    let app = application(owner, ApplicationStatus::Apply, &[]);
    let app_id = app.id.unwrap();
    let (_repo, _storage, service) = service_with(vec![app]);

    // A different authenticated user is refused
    let result = service.get_application(app_id, &user_claims(&ObjectId::new())).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    // The owner and an admin both succeed
    assert!(service.get_application(app_id, &user_claims(&owner)).await.is_ok());
    assert!(service.get_application(app_id, &admin_claims()).await.is_ok());
}

#[tokio::test]
async fn test_get_application_missing_is_not_found() {
    let (_repo, _storage, service) = service_with(vec![]);
    let result = service.get_application(ObjectId::new(), &admin_claims()).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_attach_files_enforces_record_limit() {
    let owner = ObjectId::new();
    let app = application(
        owner,
        ApplicationStatus::Apply,
        &["applications/x/1_0_a.zip", "applications/x/1_1_b.zip", "applications/x/1_2_c.zip"],
    );
    let app_id = app.id.unwrap();
    let (repo, storage, service) = service_with(vec![app]);

    // 3 existing + 3 new exceeds the limit of 5
    let files = vec![upload("d.zip"), upload("e.zip"), upload("f.zip")];
    let result = service.attach_files(app_id, &user_claims(&owner), files).await;

    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    assert!(storage.call_log().is_empty());
    assert_eq!(repo.get(&app_id).unwrap().files.len(), 3);
}

#[tokio::test]
async fn test_purge_refuses_non_cancelled_application() {
    let app = application(ObjectId::new(), ApplicationStatus::InProgress, &["applications/x/1_0_a.zip"]);
    let app_id = app.id.unwrap();
    let (repo, storage, service) = service_with(vec![app]);

    let result = service.purge_application(app_id).await;

    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    // Record and blobs are untouched
    assert!(repo.get(&app_id).is_some());
    assert!(storage.call_log().is_empty());
}

#[tokio::test]
async fn test_purge_cancelled_application_removes_blobs_then_record() {
    let app = application(
        ObjectId::new(),
        ApplicationStatus::Cancelled,
        &["applications/x/1_0_a.zip", "applications/x/1_1_b.zip"],
    );
    let app_id = app.id.unwrap();
    let (repo, storage, service) = service_with(vec![app]);

    let result = service.purge_application(app_id).await.unwrap();

    assert!(result.deleted);
    assert_eq!(result.files_removed, 2);
    assert!(repo.get(&app_id).is_none());
    let removes: Vec<_> = storage
        .call_log()
        .into_iter()
        .filter(|c| matches!(c, StorageCall::Remove(_)))
        .collect();
    assert_eq!(removes.len(), 2);
}

#[tokio::test]
async fn test_cancel_is_owner_or_admin_only() {
    let owner = ObjectId::new();
    let app = application(owner, ApplicationStatus::Apply, &[]);
    let app_id = app.id.unwrap();
    let (repo, _storage, service) = service_with(vec![app]);

    let result = service.cancel_application(app_id, &user_claims(&ObjectId::new())).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let cancelled = service.cancel_application(app_id, &user_claims(&owner)).await.unwrap();
    assert_eq!(cancelled.status, ApplicationStatus::Cancelled);
    assert_eq!(repo.get(&app_id).unwrap().status, ApplicationStatus::Cancelled);
}

#[tokio::test]
async fn test_update_status_missing_application_is_not_found() {
    let (_repo, _storage, service) = service_with(vec![]);
    let result = service
        .update_status(ObjectId::new(), ApplicationStatus::Completed, Some("done".to_string()))
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}
