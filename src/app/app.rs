use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::admin_user_conf::AdminUserConfig;
use crate::config::app_conf::AppConfig;
use crate::config::jwt_conf::JwtConfig;
use crate::config::minio_conf::MinioConfig;
use crate::config::mongo_conf::MongoConfig;
use crate::middlewares::auth_middleware::AuthState;
use crate::model::user::{Authority, User};
use crate::repository::announcement_repo::MongoAnnouncementRepository;
use crate::repository::application_repo::MongoApplicationRepository;
use crate::repository::estimate_repo::MongoEstimateRepository;
use crate::repository::review_repo::MongoReviewRepository;
use crate::repository::user_repo::{MongoUserRepository, UserRepository};
use crate::service::application_service::ApplicationServiceImpl;
use crate::service::estimate_service::EstimateServiceImpl;
use crate::service::review_service::ReviewServiceImpl;
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::minio::{MinioService, ObjectStorage};

pub struct App {
    config: AppConfig,
    router: Router,
    pub user_service: Arc<UserServiceImpl>,
    pub application_service: Arc<ApplicationServiceImpl>,
    pub review_service: Arc<ReviewServiceImpl>,
    pub estimate_service: Arc<EstimateServiceImpl>,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env();

        let jwt_config = JwtConfig::from_env().expect("JWT config error");
        let mongo_config = MongoConfig::from_env().expect("Mongo config error");
        let minio_config = MinioConfig::from_env().expect("Minio config error");

        let minio_service = Arc::new(MinioService::new(minio_config).await.expect("Minio service error"));
        let storage: Arc<dyn ObjectStorage> = minio_service;

        let user_repo = Arc::new(MongoUserRepository::new(&mongo_config).await.expect("User repo error"));
        let application_repo =
            Arc::new(MongoApplicationRepository::new(&mongo_config).await.expect("Application repo error"));
        let review_repo = Arc::new(MongoReviewRepository::new(&mongo_config).await.expect("Review repo error"));
        let estimate_repo = Arc::new(MongoEstimateRepository::new(&mongo_config).await.expect("Estimate repo error"));
        let announcement_repo =
            Arc::new(MongoAnnouncementRepository::new(&mongo_config).await.expect("Announcement repo error"));

        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));

        let user_service = Arc::new(UserServiceImpl::new(
            user_repo.clone(),
            application_repo.clone(),
            review_repo.clone(),
            jwt_utils.clone(),
            storage.clone(),
        ));
        let application_service = Arc::new(ApplicationServiceImpl::new(application_repo, storage.clone()));
        let review_service = Arc::new(ReviewServiceImpl::new(review_repo, storage.clone()));
        let estimate_service = Arc::new(EstimateServiceImpl::new(estimate_repo, announcement_repo));

        let auth_state = Arc::new(AuthState { jwt_utils });

        let mut app = App {
            config,
            router: Router::new(),
            user_service,
            application_service,
            review_service,
            estimate_service,
        };
        app.router = app.create_router(auth_state, storage);
        app.create_first_admin_user(user_repo).await;
        app
    }

    fn create_router(&self, auth_state: Arc<AuthState>, storage: Arc<dyn ObjectStorage>) -> Router {
        use crate::router::application_router::application_router;
        use crate::router::estimate_router::estimate_router;
        use crate::router::review_router::review_router;
        use crate::router::storage_router::storage_router;
        use crate::router::user_router::user_router;

        Router::new()
            .merge(user_router(self.user_service.clone(), auth_state.clone()))
            .merge(application_router(self.application_service.clone(), auth_state.clone()))
            .merge(review_router(self.review_service.clone(), auth_state.clone()))
            .merge(estimate_router(self.estimate_service.clone(), auth_state.clone()))
            .merge(storage_router(storage, auth_state))
            .route("/health", get(|| async { "OK" }))
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(self.config.host.parse().expect("Invalid host"), self.config.port);
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind address");
        axum::serve(listener, self.router).await.expect("Failed to start server");
    }

    async fn create_first_admin_user(&self, user_repo: Arc<MongoUserRepository>) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Admin user config not loaded: {e}");
                return;
            }
        };

        match user_repo.find_by_email(&admin_conf.email).await {
            Ok(Some(_)) => {
                info!("Admin user already exists, skipping creation.");
                return;
            }
            Ok(None) => { /* continue to create */ }
            Err(e) => {
                error!("Failed to check for existing admin user: {e}");
                return;
            }
        }

        let user = User {
            id: None,
            username: admin_conf.username.clone(),
            email: admin_conf.email.clone(),
            phone: admin_conf.phone.clone(),
            password_hash: String::new(), // Set by register
            authority: Authority::King,
            is_deleted: false,
            oauth: None,
            created_at: None,
            updated_at: None,
        };
        match self.user_service.register(user, admin_conf.password.clone()).await {
            Ok(_) => info!("First admin user created."),
            Err(e) => error!("Failed to create admin user: {e}"),
        }
    }
}
