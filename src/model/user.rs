use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Authority {
    Guest,
    User,
    /// Administrator
    King,
}

impl Authority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::Guest => "guest",
            Authority::User => "user",
            Authority::King => "king",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Authority::King)
    }
}

/// OAuth provider metadata for socially registered accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthProvider {
    pub provider: String,
    pub provider_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub authority: Authority,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth: Option<OAuthProvider>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
