mod common;

use std::sync::Arc;
use std::time::Duration;

use bson::oid::ObjectId;
use common::{admin_claims, attached_file, user_claims, InMemoryApplicationRepo, InMemoryReviewRepo, InMemoryUserRepo, MockStorage, StorageCall};
use comdoctor_backend::config::JwtConfig;
use comdoctor_backend::model::application::{Application, ApplicationDetails, ApplicationStatus};
use comdoctor_backend::model::review::{Review, ReviewStatus};
use comdoctor_backend::model::user::{Authority, User};
use comdoctor_backend::service::user_service::{UserService, UserServiceImpl};
use comdoctor_backend::util::error::ServiceError;
use comdoctor_backend::util::jwt::JwtTokenUtilsImpl;
use comdoctor_backend::util::upload::BatchUploader;

fn make_user(email: &str, phone: &str, is_deleted: bool) -> User {
    User {
        id: Some(ObjectId::new()),
        username: "tester".to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        password_hash: String::new(),
        authority: Authority::User,
        is_deleted,
        oauth: None,
        created_at: None,
        updated_at: None,
    }
}

fn make_application(user_id: ObjectId, status: ApplicationStatus, file_keys: &[&str]) -> Application {
    Application {
        id: Some(ObjectId::new()),
        user_id,
        details: ApplicationDetails::Computer {
            purpose: "gaming build".to_string(),
            budget: Some("1500000".to_string()),
            parts_request: None,
        },
        status,
        admin_comment: None,
        files: file_keys.iter().map(|k| attached_file(k)).collect(),
        created_at: None,
        updated_at: None,
    }
}

fn make_review(user_id: ObjectId, image_keys: &[&str]) -> Review {
    Review {
        id: Some(ObjectId::new()),
        user_id,
        application_id: None,
        rating: 5,
        content: "great service".to_string(),
        images: image_keys.iter().map(|k| attached_file(k)).collect(),
        status: ReviewStatus::Active,
        is_deleted: false,
        created_at: None,
        updated_at: None,
    }
}

struct Fixture {
    user_repo: Arc<InMemoryUserRepo>,
    application_repo: Arc<InMemoryApplicationRepo>,
    review_repo: Arc<InMemoryReviewRepo>,
    storage: Arc<MockStorage>,
    service: UserServiceImpl,
}

fn fixture(users: Vec<User>, applications: Vec<Application>, reviews: Vec<Review>) -> Fixture {
    let user_repo = Arc::new(InMemoryUserRepo::with_users(users));
    let application_repo = Arc::new(InMemoryApplicationRepo::with_applications(applications));
    let review_repo = Arc::new(InMemoryReviewRepo::with_reviews(reviews));
    let storage = Arc::new(MockStorage::new());
    let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::from_test_env()));
    let uploader = BatchUploader::with_pacing(storage.clone(), Duration::ZERO, 3, Duration::ZERO);
    let service = UserServiceImpl::with_uploader(
        user_repo.clone(),
        application_repo.clone(),
        review_repo.clone(),
        jwt_utils,
        uploader,
    );
    Fixture { user_repo, application_repo, review_repo, storage, service }
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let existing = make_user("taken@example.com", "010-1111-2222", false);
    let f = fixture(vec![existing], vec![], vec![]);

    let result = f
        .service
        .register(make_user("taken@example.com", "010-3333-4444", false), "secret123".to_string())
        .await;

    assert!(matches!(result, Err(ServiceError::Conflict(_))));
    // No record was created
    assert_eq!(f.user_repo.len(), 1);
}

#[tokio::test]
async fn test_register_rejects_duplicate_phone() {
    let existing = make_user("first@example.com", "010-1111-2222", false);
    let f = fixture(vec![existing], vec![], vec![]);

    let result = f
        .service
        .register(make_user("second@example.com", "010-1111-2222", false), "secret123".to_string())
        .await;

    assert!(matches!(result, Err(ServiceError::Conflict(_))));
    assert_eq!(f.user_repo.len(), 1);
}

#[tokio::test]
async fn test_register_hashes_password_and_issues_tokens() {
    let f = fixture(vec![], vec![], vec![]);

    let response = f
        .service
        .register(make_user("new@example.com", "010-1234-5678", false), "secret123".to_string())
        .await
        .unwrap();

    assert_eq!(response.user.email, "new@example.com");
    assert!(!response.tokens.access_token.is_empty());

    let stored = f.user_repo.users.lock().unwrap()[0].clone();
    assert!(stored.password_hash.starts_with("$2"));
    assert_ne!(stored.password_hash, "secret123");
}

#[tokio::test]
async fn test_login_rejects_soft_deleted_account() {
    let mut user = make_user("gone@example.com", "010-9999-8888", true);
    user.password_hash = bcrypt::hash("secret123", 4).unwrap();
    let f = fixture(vec![user], vec![], vec![]);

    let result = f.service.login("gone@example.com".to_string(), "secret123".to_string()).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_purge_refuses_active_user() {
    let user = make_user("active@example.com", "010-1234-5678", false);
    let user_id = user.id.unwrap();
    let f = fixture(vec![user], vec![], vec![]);

    let result = f.service.purge_user(user_id).await;

    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    assert_eq!(f.user_repo.len(), 1);
}

#[tokio::test]
async fn test_purge_cascades_applications_reviews_and_blobs() {
    let user = make_user("leaver@example.com", "010-1234-5678", true);
    let user_id = user.id.unwrap();
    let other_user = make_user("stays@example.com", "010-8765-4321", false);
    let other_id = other_user.id.unwrap();

    let applications = vec![
        make_application(user_id, ApplicationStatus::Completed, &["applications/u/1_0_a.zip", "applications/u/1_1_b.zip"]),
        make_application(user_id, ApplicationStatus::Cancelled, &["applications/u/2_0_c.zip"]),
        make_application(other_id, ApplicationStatus::Apply, &["applications/o/1_0_keep.zip"]),
    ];
    let reviews = vec![
        make_review(user_id, &["reviews/u/1_0_a.png"]),
        make_review(other_id, &["reviews/o/1_0_keep.png"]),
    ];

    let f = fixture(vec![user, other_user], applications, reviews);

    let summary = f.service.purge_user(user_id).await.unwrap();

    // Reported counts match what was actually removed
    assert_eq!(summary.applications_deleted, 2);
    assert_eq!(summary.application_files_deleted, 3);
    assert_eq!(summary.reviews_deleted, 1);
    assert_eq!(summary.review_images_deleted, 1);

    // The user's records are gone, everyone else's remain
    assert_eq!(f.user_repo.len(), 1);
    assert_eq!(f.application_repo.len(), 1);
    assert_eq!(f.review_repo.len(), 1);

    // Every blob belonging to the purged user was deleted from storage
    let removed: Vec<String> = f
        .storage
        .call_log()
        .into_iter()
        .filter_map(|c| match c {
            StorageCall::Remove(key) => Some(key),
            _ => None,
        })
        .collect();
    assert_eq!(removed.len(), 4);
    assert!(removed.iter().all(|k| k.contains("/u/")));
}

#[tokio::test]
async fn test_purge_proceeds_when_blob_deletion_fails() {
    let user = make_user("leaver@example.com", "010-1234-5678", true);
    let user_id = user.id.unwrap();
    let applications = vec![make_application(user_id, ApplicationStatus::Cancelled, &["applications/u/1_0_a.zip"])];

    let user_repo = Arc::new(InMemoryUserRepo::with_users(vec![user]));
    let application_repo = Arc::new(InMemoryApplicationRepo::with_applications(applications));
    let review_repo = Arc::new(InMemoryReviewRepo::new());
    let storage = Arc::new(MockStorage::with_failing_removes());
    let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::from_test_env()));
    let uploader = BatchUploader::with_pacing(storage.clone(), Duration::ZERO, 3, Duration::ZERO);
    let service = UserServiceImpl::with_uploader(
        user_repo.clone(),
        application_repo.clone(),
        review_repo,
        jwt_utils,
        uploader,
    );

    let summary = service.purge_user(user_id).await.unwrap();

    // Storage cleanup is best-effort; the database deletes still happen
    assert_eq!(summary.application_files_deleted, 0);
    assert_eq!(summary.applications_deleted, 1);
    assert_eq!(user_repo.len(), 0);
    assert_eq!(application_repo.len(), 0);
}

#[tokio::test]
async fn test_soft_delete_requires_self_or_admin() {
    let user = make_user("victim@example.com", "010-1234-5678", false);
    let user_id = user.id.unwrap();
    let f = fixture(vec![user], vec![], vec![]);

    let stranger = user_claims(&ObjectId::new());
    let result = f.service.soft_delete_user(user_id, &stranger).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    f.service.soft_delete_user(user_id, &admin_claims()).await.unwrap();
    assert!(f.user_repo.users.lock().unwrap()[0].is_deleted);
}

#[tokio::test]
async fn test_list_users_joins_activity_stats() {
    let user_a = make_user("a@example.com", "010-1111-1111", false);
    let a_id = user_a.id.unwrap();
    let user_b = make_user("b@example.com", "010-2222-2222", false);

    let applications = vec![
        make_application(a_id, ApplicationStatus::Apply, &[]),
        make_application(a_id, ApplicationStatus::Completed, &[]),
    ];
    let mut review = make_review(a_id, &[]);
    review.rating = 4;
    let mut review2 = make_review(a_id, &[]);
    review2.rating = 2;

    let f = fixture(vec![user_a, user_b], applications, vec![review, review2]);

    let (rows, total) = f.service.list_users_with_stats(1, 20).await.unwrap();
    assert_eq!(total, 2);

    let row_a = rows.iter().find(|r| r.user.email == "a@example.com").unwrap();
    assert_eq!(row_a.service_count, 2);
    assert_eq!(row_a.review_count, 2);
    assert!((row_a.average_rating - 3.0).abs() < f64::EPSILON);

    let row_b = rows.iter().find(|r| r.user.email == "b@example.com").unwrap();
    assert_eq!(row_b.service_count, 0);
    assert_eq!(row_b.review_count, 0);
}
