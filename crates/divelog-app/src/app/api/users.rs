use divelog_core::constants::USERS_ROUTE_COMPONENT;
use divelog_db::model::dive::DiveRecord;
use divelog_service::error::ServiceError;
use salvo::{Depot, Request, Router, handler, writing::Json};

use crate::error::AppResult;
use crate::services_handler::get_services_from_depot;

/// ## Summary
/// GET /api/users/{user_id}/dives - Every dive of one owner.
///
/// ## Errors
/// Returns HTTP 503 if the store fails.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn list_dives(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<DiveRecord>>> {
    let services = get_services_from_depot(depot)?;
    let user_id = req.param::<String>("user_id").unwrap_or_default();

    Ok(Json(services.dives.list(&user_id).await?))
}

/// ## Summary
/// GET /api/users/{user_id}/dives/{dive_number} - Lookup by the natural key.
///
/// ## Errors
/// Returns HTTP 400 for a non-numeric dive number and HTTP 404 when the
/// owner has no such dive.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn get_dive_by_number(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<DiveRecord>> {
    let services = get_services_from_depot(depot)?;
    let user_id = req.param::<String>("user_id").unwrap_or_default();
    let dive_number = req.param::<i32>("dive_number").ok_or_else(|| {
        ServiceError::InvalidQuery("Dive number must be an integer".to_string())
    })?;

    Ok(Json(services.dives.get_by_key(&user_id, dive_number).await?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(USERS_ROUTE_COMPONENT).push(
        Router::with_path("{user_id}/dives")
            .get(list_dives)
            .push(Router::with_path("{dive_number}").get(get_dive_by_number)),
    )
}
