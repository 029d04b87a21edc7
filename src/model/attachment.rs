use serde::{Deserialize, Serialize};

/// Metadata for one remote attachment object, embedded in the owning
/// document (application file or review image).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachedFile {
    /// Public URL of the stored object
    pub url: String,
    /// Object key inside the storage bucket
    pub filename: String,
    /// Name the file was uploaded with
    pub original_name: String,
    pub mime_type: String,
    pub size: usize,
    pub uploaded_at: String,
}
