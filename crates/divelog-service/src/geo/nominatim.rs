use async_trait::async_trait;
use divelog_core::config::GeocoderConfig;
use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};
use crate::geo::{GeoResolver, GeocodeResult, usable_query};

/// Geocoder backed by a Nominatim-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct NominatimResolver {
    client: reqwest::Client,
    base_url: String,
    result_limit: u8,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl NominatimResolver {
    /// ## Summary
    /// Builds a resolver with the identifying User-Agent and timeout from
    /// configuration.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidConfiguration` if the HTTP client cannot
    /// be built.
    pub fn new(config: &GeocoderConfig) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.timeout())
            .build()
            .map_err(|e| ServiceError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            result_limit: config.result_limit,
        })
    }

    async fn get_text(&self, path: &str, params: &[(&str, String)]) -> ServiceResult<String> {
        let response = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(params)
            .send()
            .await
            .map_err(|e| ServiceError::ResolverUnavailable(format!("geocoder request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::ResolverUnavailable(format!(
                "geocoder returned status {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ServiceError::ResolverUnavailable(format!("geocoder body unreadable: {e}")))
    }
}

#[async_trait]
impl GeoResolver for NominatimResolver {
    #[tracing::instrument(skip(self))]
    async fn forward(&self, query: &str) -> ServiceResult<Vec<GeocodeResult>> {
        let Some(query) = usable_query(query) else {
            tracing::debug!("Query too short, skipping geocoder");
            return Ok(Vec::new());
        };

        let body = self
            .get_text(
                "search",
                &[
                    ("q", query.to_string()),
                    ("format", "jsonv2".to_string()),
                    ("addressdetails", "1".to_string()),
                    ("limit", self.result_limit.to_string()),
                ],
            )
            .await?;

        let results = parse_search_body(&body, usize::from(self.result_limit))?;
        tracing::debug!(count = results.len(), "Geocoder returned candidates");
        Ok(results)
    }

    #[tracing::instrument(skip(self))]
    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> ServiceResult<Option<GeocodeResult>> {
        let body = self
            .get_text(
                "reverse",
                &[
                    ("lat", latitude.to_string()),
                    ("lon", longitude.to_string()),
                    ("format", "jsonv2".to_string()),
                    ("addressdetails", "1".to_string()),
                ],
            )
            .await?;

        parse_reverse_body(&body)
    }
}

/// ## Summary
/// Parses a `/search` response into at most `limit` candidates, skipping
/// entries whose coordinates do not parse.
///
/// ## Errors
/// Returns `ServiceError::ResolverUnavailable` if the body is not a JSON
/// array of places.
pub fn parse_search_body(body: &str, limit: usize) -> ServiceResult<Vec<GeocodeResult>> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body).map_err(|e| {
        ServiceError::ResolverUnavailable(format!("unexpected geocoder response: {e}"))
    })?;

    Ok(places
        .into_iter()
        .filter_map(into_result)
        .take(limit)
        .collect())
}

/// ## Summary
/// Parses a `/reverse` response. The provider signals "no coverage" with an
/// `{"error": ...}` object, which maps to `None`.
///
/// ## Errors
/// Returns `ServiceError::ResolverUnavailable` if the body is not JSON.
pub fn parse_reverse_body(body: &str) -> ServiceResult<Option<GeocodeResult>> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        ServiceError::ResolverUnavailable(format!("unexpected geocoder response: {e}"))
    })?;

    if value.get("error").is_some() || value.is_null() {
        return Ok(None);
    }

    Ok(serde_json::from_value::<NominatimPlace>(value)
        .ok()
        .and_then(into_result))
}

fn into_result(place: NominatimPlace) -> Option<GeocodeResult> {
    let latitude = place.lat.trim().parse::<f64>().ok()?;
    let longitude = place.lon.trim().parse::<f64>().ok()?;
    let address = place.address.unwrap_or_default();

    let short_name = place
        .name
        .filter(|name| !name.trim().is_empty())
        .or_else(|| {
            place
                .display_name
                .split(',')
                .next()
                .map(|first| first.trim().to_string())
        })
        .unwrap_or_default();

    Some(GeocodeResult {
        latitude,
        longitude,
        short_name,
        formatted_address: place.display_name,
        city: address
            .city
            .or(address.town)
            .or(address.village)
            .or(address.municipality),
        state: address.state,
        country: address.country,
    })
}
