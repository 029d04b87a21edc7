use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::attachment::AttachedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Register,
    Active,
    Hidden,
    Deleted,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Register => "register",
            ReviewStatus::Active => "active",
            ReviewStatus::Hidden => "hidden",
            ReviewStatus::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "register" => Some(ReviewStatus::Register),
            "active" => Some(ReviewStatus::Active),
            "hidden" => Some(ReviewStatus::Hidden),
            "deleted" => Some(ReviewStatus::Deleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ObjectId>,
    /// 1 to 5
    pub rating: u8,
    pub content: String,
    #[serde(default)]
    pub images: Vec<AttachedFile>,
    pub status: ReviewStatus,
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Review {
    /// Both the flag and the status must agree before a hard delete.
    pub fn terminally_deleted(&self) -> bool {
        self.is_deleted && self.status == ReviewStatus::Deleted
    }

    /// Shown in the public listing.
    pub fn is_visible(&self) -> bool {
        self.status == ReviewStatus::Active && !self.is_deleted
    }
}
