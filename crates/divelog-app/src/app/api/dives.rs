use divelog_core::constants::DIVES_ROUTE_COMPONENT;
use divelog_db::model::dive::DiveRecord;
use divelog_service::dive::{DiveSubmission, UpsertedDive};
use divelog_service::error::ServiceError;
use divelog_service::photo::ensure_supported_content_type;
use divelog_service::services::PhotoDiveOutcome;
use salvo::{Depot, Request, Router, handler, writing::Json};
use serde::Serialize;

use crate::app::api::enrich_requested;
use crate::app::api::upload::read_photo;
use crate::error::{AppError, AppResult};
use crate::services_handler::get_services_from_depot;

#[derive(Debug, Serialize)]
pub struct DeleteDiveResponse {
    pub id: uuid::Uuid,
    pub deleted: bool,
}

fn dive_id(req: &Request) -> Result<uuid::Uuid, ServiceError> {
    let raw = req.param::<String>("dive_id").unwrap_or_default();
    uuid::Uuid::parse_str(&raw)
        .map_err(|_err| ServiceError::NotFound(format!("Dive with id '{raw}' not found")))
}

/// ## Summary
/// POST /api/dives/upsert - Inserts the dive or patches the one with the
/// same `(user_id, dive_number)`, enriching it first unless `enrich=false`.
///
/// ## Side Effects
/// One dive store write on success.
///
/// ## Errors
/// Returns HTTP 400 for malformed JSON or invalid dive data (every offending
/// field is listed) and HTTP 503 if the store fails.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn upsert(req: &mut Request, depot: &mut Depot) -> AppResult<Json<UpsertedDive>> {
    let services = get_services_from_depot(depot)?;
    let enrich = enrich_requested(req);

    let body = req
        .payload()
        .await
        .map_err(|e| AppError::InvalidJson(e.to_string()))?;
    let submission = DiveSubmission::from_json(body)?;

    Ok(Json(services.submit_dive(submission, enrich).await?))
}

/// ## Summary
/// POST /api/dives/upsert-with-photo - Multipart `file` plus a `dive_data`
/// JSON field without `photo_storage_id`. Uploads the photo, attaches its
/// reference, enriches and upserts the dive.
///
/// ## Side Effects
/// One photo upload and one dive store write. Nothing is uploaded when the
/// file type or the dive data is rejected.
///
/// ## Errors
/// Returns HTTP 400 for an unsupported file type, malformed `dive_data`
/// JSON or invalid dive data, and HTTP 503 if a store fails.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn upsert_with_photo(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<PhotoDiveOutcome>> {
    let services = get_services_from_depot(depot)?;
    let enrich = enrich_requested(req);

    let photo = read_photo(req, depot).await?;
    ensure_supported_content_type(&photo.content_type)?;

    let raw = req
        .form::<String>("dive_data")
        .await
        .ok_or_else(|| AppError::BadRequest("Missing 'dive_data' field".to_string()))?;
    let submission = DiveSubmission::from_json(raw.as_bytes())?;

    Ok(Json(
        services
            .submit_dive_with_photo(submission, photo, enrich)
            .await?,
    ))
}

/// ## Summary
/// GET /api/dives/{dive_id} - One dive by storage ID.
///
/// ## Errors
/// Returns HTTP 404 for an unknown or malformed ID.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn get_dive(req: &mut Request, depot: &mut Depot) -> AppResult<Json<DiveRecord>> {
    let services = get_services_from_depot(depot)?;
    let id = dive_id(req)?;

    Ok(Json(services.dives.get(id).await?))
}

/// ## Summary
/// DELETE /api/dives/{dive_id} - Removes a dive. Its photo stays in the
/// photo store.
///
/// ## Errors
/// Returns HTTP 404 for an unknown or malformed ID.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn delete_dive(req: &mut Request, depot: &mut Depot) -> AppResult<Json<DeleteDiveResponse>> {
    let services = get_services_from_depot(depot)?;
    let id = dive_id(req)?;

    services.dives.delete(id).await?;

    Ok(Json(DeleteDiveResponse { id, deleted: true }))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(DIVES_ROUTE_COMPONENT)
        .push(Router::with_path("upsert").post(upsert))
        .push(Router::with_path("upsert-with-photo").post(upsert_with_photo))
        .push(
            Router::with_path("{dive_id}")
                .get(get_dive)
                .delete(delete_dive),
        )
}
