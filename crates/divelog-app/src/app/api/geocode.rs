use divelog_service::error::ServiceError;
use divelog_service::geo::{GeocodeResult, coordinate_label};
use salvo::{Depot, Request, Router, handler, writing::Json};
use serde::Serialize;

use crate::error::AppResult;
use crate::services_handler::get_services_from_depot;

#[derive(Debug, Serialize)]
pub struct ForwardGeocodeResponse {
    pub query: String,
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Serialize)]
pub struct ReverseGeocodeResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
    pub result: Option<GeocodeResult>,
}

/// ## Summary
/// GET /api/geocode?q= - Ranked place candidates for a free-text query.
///
/// ## Errors
/// Returns HTTP 400 if `q` is missing and HTTP 503 if the geocoder fails.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn forward(req: &mut Request, depot: &mut Depot) -> AppResult<Json<ForwardGeocodeResponse>> {
    let services = get_services_from_depot(depot)?;
    let query = req
        .query::<String>("q")
        .ok_or_else(|| ServiceError::InvalidQuery("Query parameter 'q' is required".to_string()))?;

    let results = services.geo.forward(&query).await?;

    Ok(Json(ForwardGeocodeResponse { query, results }))
}

/// ## Summary
/// GET /api/geocode/reverse?lat=&lon= - Best match for a coordinate pair and
/// a display name that falls back to the coordinates.
///
/// ## Errors
/// Returns HTTP 400 for missing or out of range coordinates and HTTP 503 if
/// the geocoder fails.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn reverse(req: &mut Request, depot: &mut Depot) -> AppResult<Json<ReverseGeocodeResponse>> {
    let services = get_services_from_depot(depot)?;

    let (Some(latitude), Some(longitude)) = (req.query::<f64>("lat"), req.query::<f64>("lon"))
    else {
        return Err(ServiceError::InvalidQuery(
            "Query parameters 'lat' and 'lon' must be numbers".to_string(),
        )
        .into());
    };

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(ServiceError::InvalidQuery("Coordinates out of range".to_string()).into());
    }

    let result = services.geo.reverse(latitude, longitude).await?;
    let display_name = result.as_ref().map_or_else(
        || coordinate_label(latitude, longitude),
        |r| r.formatted_address.clone(),
    );

    Ok(Json(ReverseGeocodeResponse {
        latitude,
        longitude,
        display_name,
        result,
    }))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("geocode")
        .get(forward)
        .push(Router::with_path("reverse").get(reverse))
}
