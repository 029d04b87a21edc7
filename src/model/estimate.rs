use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One line of a quote, as captured from the price-comparison listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateItem {
    pub category: String,
    pub product_name: String,
    pub quantity: u32,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: String,
    pub shipping_fee: i64,
    pub discount: i64,
}

/// A persisted sales quote. Totals arrive precomputed from the client
/// and are stored as supplied; only their types are checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub customer_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub estimate_type: String,
    pub contractor_status: bool,
    pub items: Vec<EstimateItem>,
    pub payment: PaymentInfo,
    pub supply_amount: i64,
    pub tax_amount: i64,
    pub total_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
