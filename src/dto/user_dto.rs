use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::user::{Authority, User};

#[derive(Debug, Clone, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Account projection without the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub authority: Authority,
    pub is_deleted: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            authority: user.authority,
            is_deleted: user.is_deleted,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// One row of the admin dashboard: account plus aggregated activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithStats {
    #[serde(flatten)]
    pub user: UserSummary,
    pub service_count: i64,
    pub review_count: i64,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserWithStats>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Counts reported back from a cascading user hard delete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CascadeSummary {
    pub applications_deleted: u64,
    pub application_files_deleted: usize,
    pub reviews_deleted: u64,
    pub review_images_deleted: usize,
}
