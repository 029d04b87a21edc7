pub mod user_handler;
pub mod application_handler;
pub mod review_handler;
pub mod estimate_handler;
pub mod storage_handler;

use axum::extract::Multipart;
use bytes::BytesMut;
use tracing::{debug, error, info};

use crate::util::error::HandlerError;
use crate::util::upload::UploadFile;

/// Read a multipart request into its `json` part and its `file*` parts.
/// Other field names are ignored.
pub(crate) async fn read_multipart(mut multipart: Multipart) -> Result<(Option<Vec<u8>>, Vec<UploadFile>), HandlerError> {
    let mut json_data: Option<Vec<u8>> = None;
    let mut files: Vec<UploadFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| {
            error!("Error getting next multipart field: {}", e);
            HandlerError::bad_request(format!("Failed to get next field: {}", e))
        })?
    {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        debug!("Processing multipart field: {}", name);

        if name == "json" {
            let data = field.bytes().await.map_err(|e| {
                error!("Failed to read json field: {}", e);
                HandlerError::bad_request(format!("Failed to read json field: {}", e))
            })?;
            json_data = Some(data.to_vec());
        } else if name.starts_with("file") || name.starts_with("image") {
            let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
            let content_type = field.content_type().map(|s| s.to_string()).unwrap_or_default();
            let mut buf = BytesMut::new();
            let mut stream = field;
            while let Some(chunk) = stream.chunk().await.map_err(|e| {
                error!("Error reading file chunk: {}", e);
                HandlerError::bad_request(format!("Failed to read file chunk: {}", e))
            })? {
                buf.extend_from_slice(&chunk);
            }
            info!("Received file: {} ({} bytes)", filename, buf.len());
            let size = buf.len();
            files.push(UploadFile {
                filename,
                content_type,
                content: buf.to_vec(),
                size,
            });
        }
    }

    Ok((json_data, files))
}
