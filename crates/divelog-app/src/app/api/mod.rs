mod app_specific;
mod club;
mod dives;
mod geocode;
mod metadata;
mod photos;
mod upload;
mod users;

use divelog_core::constants::API_ROUTE_COMPONENT;
use salvo::{Request, Router};

/// ## Summary
/// Constructs the API router with every dive log endpoint.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(app_specific::routes())
        .push(geocode::routes())
        .push(club::routes())
        .push(metadata::routes())
        .push(photos::routes())
        .push(dives::routes())
        .push(users::routes())
}

/// Enrichment runs unless the request opts out with `?enrich=false`.
fn enrich_requested(req: &Request) -> bool {
    req.query::<bool>("enrich").unwrap_or(true)
}
