//! The bundle of services the HTTP layer works with.

use std::sync::Arc;

use divelog_core::clock::Clock;
use divelog_core::config::{PhotoBackend, Settings};
use divelog_db::store::DiveRecordStore;
use serde::Serialize;

use crate::club::{ClubWebsiteResolver, DuckDuckGoResolver};
use crate::dive::{DiveEnricher, DiveSubmission, DiveUpsertWorkflow, UpsertedDive};
use crate::error::ServiceResult;
use crate::geo::{CachedGeoResolver, GeoResolver, NominatimResolver};
use crate::photo::{
    ConvexPhotoStore, MemoryPhotoStore, PhotoStore, StorageId, ensure_supported_content_type,
};

/// An uploaded photo as received from a client.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Outcome of uploading a photo and upserting the dive that references it.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoDiveOutcome {
    pub photo_storage_id: StorageId,
    #[serde(flatten)]
    pub upserted: UpsertedDive,
}

#[derive(Clone)]
pub struct DiveServices {
    pub geo: Arc<dyn GeoResolver>,
    pub club: Arc<dyn ClubWebsiteResolver>,
    pub photos: Arc<dyn PhotoStore>,
    pub dives: DiveUpsertWorkflow,
    pub enricher: DiveEnricher,
}

impl DiveServices {
    #[must_use]
    pub fn new(
        geo: Arc<dyn GeoResolver>,
        club: Arc<dyn ClubWebsiteResolver>,
        photos: Arc<dyn PhotoStore>,
        store: Arc<dyn DiveRecordStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            enricher: DiveEnricher::new(geo.clone(), club.clone()),
            dives: DiveUpsertWorkflow::new(store, clock),
            geo,
            club,
            photos,
        }
    }

    /// ## Summary
    /// Builds the HTTP-backed resolvers and the configured photo backend
    /// around the given dive store. The geocoder is wrapped in a cache when
    /// a cache TTL is configured.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidConfiguration` if a client or backend
    /// cannot be built from the settings.
    pub fn from_settings(
        settings: &Settings,
        store: Arc<dyn DiveRecordStore>,
        clock: Arc<dyn Clock>,
    ) -> ServiceResult<Self> {
        let nominatim: Arc<dyn GeoResolver> = Arc::new(NominatimResolver::new(&settings.geocoder)?);
        let geo: Arc<dyn GeoResolver> = match settings.geocoder.cache_ttl() {
            Some(ttl) => Arc::new(CachedGeoResolver::new(
                nominatim,
                clock.clone(),
                ttl,
                settings.geocoder.cache_capacity,
            )?),
            None => nominatim,
        };

        let club: Arc<dyn ClubWebsiteResolver> =
            Arc::new(DuckDuckGoResolver::new(&settings.club_search)?);

        let photos: Arc<dyn PhotoStore> = match settings.photos.backend {
            PhotoBackend::Convex => Arc::new(ConvexPhotoStore::new(&settings.photos)?),
            PhotoBackend::Memory => {
                tracing::warn!("Using in-memory photo store, photos are lost on restart");
                Arc::new(MemoryPhotoStore::new(settings.photos.max_bytes))
            }
        };

        Ok(Self::new(geo, club, photos, store, clock))
    }

    /// ## Errors
    /// `ServiceError::UploadRejected` for unsupported content types, plus any
    /// photo store error.
    #[tracing::instrument(skip(self, upload), fields(content_type = %upload.content_type, size = upload.bytes.len()))]
    pub async fn upload_photo(&self, upload: PhotoUpload) -> ServiceResult<StorageId> {
        ensure_supported_content_type(&upload.content_type)?;
        self.photos.upload(upload.bytes, &upload.content_type).await
    }

    /// ## Summary
    /// Upserts a dive, optionally enriching it first. The submission is
    /// checked before any resolver is called.
    ///
    /// ## Errors
    /// See [`DiveUpsertWorkflow::upsert`].
    pub async fn submit_dive(
        &self,
        mut submission: DiveSubmission,
        enrich: bool,
    ) -> ServiceResult<UpsertedDive> {
        submission.check()?;

        if enrich {
            self.enricher.enrich(&mut submission).await;
        }

        self.dives.upsert(submission).await
    }

    /// ## Summary
    /// Checks the submission, uploads the photo, attaches its reference and
    /// upserts the dive. An invalid submission uploads nothing.
    ///
    /// ## Errors
    /// Validation, upload and store errors as for the individual steps.
    pub async fn submit_dive_with_photo(
        &self,
        submission: DiveSubmission,
        photo: PhotoUpload,
        enrich: bool,
    ) -> ServiceResult<PhotoDiveOutcome> {
        ensure_supported_content_type(&photo.content_type)?;
        submission.check_before_photo()?;

        let storage_id = self.upload_photo(photo).await?;
        let upserted = self
            .submit_dive(submission.with_photo(storage_id.clone()), enrich)
            .await?;

        Ok(PhotoDiveOutcome {
            photo_storage_id: storage_id,
            upserted,
        })
    }
}
