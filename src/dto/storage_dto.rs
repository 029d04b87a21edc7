use serde::{Deserialize, Serialize};

/// Body of `DELETE /storage/object`. The key is optional so a missing
/// field maps to a 400 instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteObjectRequest {
    pub object_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteObjectResponse {
    pub deleted: bool,
    pub object_key: String,
}
