use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::estimate::{Estimate, EstimateItem, PaymentInfo};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveEstimateRequest {
    #[validate(length(min = 2, max = 100))]
    pub customer_name: String,

    #[validate(length(min = 9, max = 20))]
    pub phone: String,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 2, max = 50))]
    pub estimate_type: String,

    pub contractor_status: bool,

    #[validate(length(min = 1))]
    pub items: Vec<EstimateItem>,

    pub payment: PaymentInfo,

    // Totals are client-computed; stored as supplied
    pub supply_amount: i64,
    pub tax_amount: i64,
    pub total_amount: i64,

    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

/// Query parameters of `GET /estimates/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateSearchQuery {
    pub keyword: Option<String>,
    pub search_type: Option<String>,
    pub estimate_type: Option<String>,
    pub contractor_status: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EstimateSearchResponse {
    pub estimates: Vec<Estimate>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}
