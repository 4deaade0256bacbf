use divelog_service::club::ClubWebsiteResult;
use divelog_service::error::ServiceError;
use salvo::{Depot, Request, Router, handler, writing::Json};

use crate::error::AppResult;
use crate::services_handler::get_services_from_depot;

/// ## Summary
/// GET /api/search-club?q= - First web search result for a club name.
///
/// ## Errors
/// Returns HTTP 400 for a blank query, HTTP 404 when the search page has no
/// usable result and HTTP 503 if the search endpoint fails.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn search_club(req: &mut Request, depot: &mut Depot) -> AppResult<Json<ClubWebsiteResult>> {
    let services = get_services_from_depot(depot)?;
    let query = req.query::<String>("q").unwrap_or_default();

    let result = services
        .club
        .resolve(&query)
        .await?
        .ok_or_else(|| ServiceError::NotFound("No results found".to_string()))?;

    Ok(Json(result))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("search-club").get(search_club)
}
