use divelog_core::constants::PHOTOS_ROUTE_COMPONENT;
use divelog_service::photo::StorageId;
use salvo::http::header;
use salvo::{Depot, Request, Response, Router, handler, writing::Json};
use serde::Serialize;

use crate::app::api::upload::read_photo;
use crate::error::AppResult;
use crate::services_handler::get_services_from_depot;

#[derive(Debug, Serialize)]
pub struct UploadPhotoResponse {
    pub photo_storage_id: StorageId,
}

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub storage_id: StorageId,
    pub url: String,
}

/// ## Summary
/// POST /api/photos - Uploads the multipart `file` field to the photo store.
///
/// ## Errors
/// Returns HTTP 400 for a missing file or unsupported content type and
/// HTTP 503 if the photo store fails.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn upload_photo(req: &mut Request, depot: &mut Depot) -> AppResult<Json<UploadPhotoResponse>> {
    let services = get_services_from_depot(depot)?;
    let photo = read_photo(req, depot).await?;

    let photo_storage_id = services.upload_photo(photo).await?;

    Ok(Json(UploadPhotoResponse { photo_storage_id }))
}

/// ## Summary
/// GET /api/photos/{storage_id} - Resolves a photo reference to its URL.
///
/// ## Errors
/// Returns HTTP 404 for an unknown reference.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn get_photo(req: &mut Request, depot: &mut Depot) -> AppResult<Json<PhotoResponse>> {
    let services = get_services_from_depot(depot)?;
    let storage_id = StorageId::new(req.param::<String>("storage_id").unwrap_or_default());

    let url = services.photos.resolve_url(&storage_id).await?;

    Ok(Json(PhotoResponse { storage_id, url }))
}

/// ## Summary
/// GET /api/photos/{storage_id}/content - Serves the stored bytes inline
/// under the type they were uploaded as.
///
/// ## Errors
/// Returns HTTP 404 for an unknown reference and HTTP 503 if the photo store
/// fails.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn download_photo(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let services = get_services_from_depot(depot)?;
    let storage_id = StorageId::new(req.param::<String>("storage_id").unwrap_or_default());

    let photo = services.photos.download(&storage_id).await?;

    if res
        .add_header(header::CONTENT_TYPE, photo.content_type.as_str(), true)
        .is_err()
    {
        tracing::warn!(content_type = %photo.content_type, "Unrepresentable content type");
    }
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header(header::CONTENT_LENGTH, photo.bytes.len(), true);
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header(
        header::CONTENT_DISPOSITION,
        format!("inline; filename=\"{storage_id}\""),
        true,
    );
    res.body(photo.bytes);

    Ok(())
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(PHOTOS_ROUTE_COMPONENT)
        .post(upload_photo)
        .push(
            Router::with_path("{storage_id}")
                .get(get_photo)
                .push(Router::with_path("content").get(download_photo)),
        )
}
