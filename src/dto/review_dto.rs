use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::review::Review;

/// JSON part of the multipart review submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,

    #[validate(length(min = 2, max = 2000))]
    pub content: String,

    /// Hex ObjectId of the serviced application, when linked
    #[validate(length(equal = 24))]
    pub application_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateReviewStatusRequest {
    #[validate(length(min = 2, max = 50))]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<Review>,
}
