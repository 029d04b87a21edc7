use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Singleton-per-kind text blob shown on quote documents (legal
/// disclaimer and similar boilerplate). Upserts are keyed by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteAnnouncement {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub kind: String,
    pub content: String,
    pub updated_at: Option<String>,
}
