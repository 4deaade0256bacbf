use divelog_service::dive::ResolvedMetadata;
use salvo::{Depot, Request, Router, handler, writing::Json};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services_handler::get_services_from_depot;

#[derive(Debug, Deserialize)]
pub struct ResolveMetadataRequest {
    pub location_name: String,
    pub club_name: String,
}

/// ## Summary
/// POST /api/resolve-dive-metadata - Previews the coordinates, map link and
/// club website that enrichment would attach. Resolver failures leave the
/// corresponding fields empty.
///
/// ## Errors
/// Returns HTTP 400 if the body is not a valid request.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn resolve_metadata(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<ResolvedMetadata>> {
    let services = get_services_from_depot(depot)?;
    let request: ResolveMetadataRequest = req
        .parse_json()
        .await
        .map_err(|e| AppError::InvalidJson(e.to_string()))?;

    let metadata = services
        .enricher
        .resolve_metadata(&request.location_name, &request.club_name)
        .await;

    Ok(Json(metadata))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("resolve-dive-metadata").post(resolve_metadata)
}
