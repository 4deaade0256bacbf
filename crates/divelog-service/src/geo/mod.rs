//! Forward and reverse geocoding.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ServiceResult;

pub mod cache;
pub mod nominatim;

pub use cache::CachedGeoResolver;
pub use nominatim::NominatimResolver;

/// Queries shorter than this (after trimming) are answered with no results.
pub const MIN_QUERY_CHARS: usize = 2;

/// One geocoding candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub short_name: String,
    pub formatted_address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// ## Summary
    /// Ranked candidates for a free-text place query, best first. Queries
    /// shorter than [`MIN_QUERY_CHARS`] yield an empty list.
    ///
    /// ## Errors
    /// `ServiceError::ResolverUnavailable` on transport failure or a non-2xx
    /// provider response.
    async fn forward(&self, query: &str) -> ServiceResult<Vec<GeocodeResult>>;

    /// ## Summary
    /// Best match for a coordinate pair, `None` when the provider has no
    /// coverage there.
    ///
    /// ## Errors
    /// `ServiceError::ResolverUnavailable` on transport failure or a non-2xx
    /// provider response.
    async fn reverse(&self, latitude: f64, longitude: f64)
    -> ServiceResult<Option<GeocodeResult>>;

    /// ## Summary
    /// Human readable label for a coordinate pair, falling back to the
    /// coordinates themselves when reverse geocoding finds nothing.
    ///
    /// ## Errors
    /// Propagates errors from [`GeoResolver::reverse`].
    async fn display_name(&self, latitude: f64, longitude: f64) -> ServiceResult<String> {
        Ok(match self.reverse(latitude, longitude).await? {
            Some(result) => result.formatted_address,
            None => coordinate_label(latitude, longitude),
        })
    }
}

/// Returns the trimmed query, or `None` when it is too short to send.
#[must_use]
pub fn usable_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    (trimmed.chars().count() >= MIN_QUERY_CHARS).then_some(trimmed)
}

#[must_use]
pub fn coordinate_label(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.5}, {longitude:.5}")
}

/// `OpenStreetMap` link centred on a coordinate pair at street zoom.
#[must_use]
pub fn osm_link(latitude: f64, longitude: f64) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={latitude}&mlon={longitude}#map=16/{latitude}/{longitude}"
    )
}
