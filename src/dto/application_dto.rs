use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::application::Application;

/// Query parameters accepted by the admin application listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub app_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateApplicationStatusRequest {
    /// Hex ObjectId of the application
    #[validate(length(equal = 24))]
    pub id: String,

    pub status: String,

    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

/// Application plus resolved download links for its attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponseDto {
    pub application: Application,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<Application>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Result of a hard delete, reporting the storage cleanup outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub deleted: bool,
    pub files_removed: usize,
}
