use divelog_service::services::PhotoUpload;
use salvo::{Depot, Request};

use crate::config::upload_limit_from_depot;
use crate::error::{AppError, AppResult};

/// ## Summary
/// Raises the request size limit to the configured upload limit and reads
/// the multipart `file` field.
///
/// ## Errors
/// Returns HTTP 400 if the field is missing.
pub async fn read_photo(req: &mut Request, depot: &Depot) -> AppResult<PhotoUpload> {
    req.set_secure_max_size(upload_limit_from_depot(depot)?);

    let file = req
        .file("file")
        .await
        .ok_or_else(|| AppError::BadRequest("Missing 'file' field".to_string()))?;

    let content_type = file
        .content_type()
        .map_or_else(|| "application/octet-stream".to_string(), |mime| mime.to_string());

    let bytes = tokio::fs::read(file.path())
        .await
        .map_err(|e| AppError::Internal(format!("reading uploaded file: {e}")))?;

    Ok(PhotoUpload {
        bytes,
        content_type,
    })
}
