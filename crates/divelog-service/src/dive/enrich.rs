use std::sync::Arc;

use serde::Serialize;

use crate::club::ClubWebsiteResolver;
use crate::dive::submission::DiveSubmission;
use crate::geo::{GeoResolver, osm_link};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Metadata that enrichment would attach to a dive, for previewing before
/// submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMetadata {
    pub location_name: String,
    pub coordinates: Option<Coordinates>,
    pub osm_link: Option<String>,
    pub club_name: String,
    pub club_website: Option<String>,
}

/// Best-effort auto-fill of location and club metadata. Resolver failures
/// are logged and never block a submission.
#[derive(Clone)]
pub struct DiveEnricher {
    geo: Arc<dyn GeoResolver>,
    club: Arc<dyn ClubWebsiteResolver>,
}

impl DiveEnricher {
    #[must_use]
    pub fn new(geo: Arc<dyn GeoResolver>, club: Arc<dyn ClubWebsiteResolver>) -> Self {
        Self { geo, club }
    }

    /// ## Summary
    /// Fills coordinates from the location when they are missing, derives the
    /// map link from the coordinates, and looks up the club website when it
    /// is missing.
    #[tracing::instrument(skip_all)]
    pub async fn enrich(&self, submission: &mut DiveSubmission) {
        if !submission.has_coordinates()
            && let Some(location) = submission.location.as_deref()
            && let Some(coordinates) = self.coordinates_for(location).await
        {
            submission.latitude = Some(coordinates.latitude);
            submission.longitude = Some(coordinates.longitude);
        }

        if let (Some(latitude), Some(longitude)) = (submission.latitude, submission.longitude) {
            submission.osm_link = Some(osm_link(latitude, longitude));
        }

        let has_website = submission
            .club_website
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty());
        if !has_website && let Some(club_name) = submission.club_name.as_deref() {
            submission.club_website = self.website_for(club_name).await;
        }
    }

    /// ## Summary
    /// Resolves what enrichment would attach for a location and a club,
    /// without touching any dive.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_metadata(&self, location_name: &str, club_name: &str) -> ResolvedMetadata {
        let coordinates = self.coordinates_for(location_name).await;

        ResolvedMetadata {
            location_name: location_name.to_string(),
            coordinates,
            osm_link: coordinates.map(|c| osm_link(c.latitude, c.longitude)),
            club_name: club_name.to_string(),
            club_website: self.website_for(club_name).await,
        }
    }

    async fn coordinates_for(&self, location: &str) -> Option<Coordinates> {
        match self.geo.forward(location).await {
            Ok(results) => results.first().map(|first| Coordinates {
                latitude: first.latitude,
                longitude: first.longitude,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Geocoding failed, continuing without coordinates");
                None
            }
        }
    }

    async fn website_for(&self, club_name: &str) -> Option<String> {
        if club_name.trim().is_empty() {
            return None;
        }

        match self.club.resolve(club_name).await {
            Ok(result) => result.map(|r| r.url),
            Err(e) => {
                tracing::warn!(error = %e, "Club website search failed, continuing without it");
                None
            }
        }
    }
}
