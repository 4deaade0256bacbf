//! Two-phase photo upload into an external blob store.

use std::fmt;

use async_trait::async_trait;
use divelog_core::constants::ALLOWED_PHOTO_CONTENT_TYPES;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

pub mod convex;
pub mod memory;

pub use convex::ConvexPhotoStore;
pub use memory::MemoryPhotoStore;

/// Short-lived handle returned by the first upload phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget(String);

impl UploadTarget {
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque reference to a stored photo. Dives hold it as a weak reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageId(String);

impl StorageId {
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Stored bytes together with the type they were uploaded as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoContent {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// ## Errors
    /// `ServiceError::StoreUnavailable` if the store cannot issue a target.
    async fn request_upload_target(&self) -> ServiceResult<UploadTarget>;

    /// ## Summary
    /// Sends the bytes to a previously issued target and returns the stored
    /// photo's reference.
    ///
    /// ## Errors
    /// `ServiceError::UploadRejected` when the store refuses the content and
    /// `ServiceError::StoreUnavailable` on transport or server failure.
    async fn finalize(
        &self,
        target: UploadTarget,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ServiceResult<StorageId>;

    /// ## Errors
    /// `ServiceError::NotFound` for an unknown reference.
    async fn resolve_url(&self, storage_id: &StorageId) -> ServiceResult<String>;

    /// ## Summary
    /// Fetches the stored bytes and their content type.
    ///
    /// ## Errors
    /// `ServiceError::NotFound` for an unknown reference and
    /// `ServiceError::StoreUnavailable` if the bytes cannot be fetched.
    async fn download(&self, storage_id: &StorageId) -> ServiceResult<PhotoContent>;

    /// Both upload phases in sequence.
    ///
    /// ## Errors
    /// Propagates errors from either phase.
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> ServiceResult<StorageId> {
        let target = self.request_upload_target().await?;
        self.finalize(target, bytes, content_type).await
    }
}

/// ## Errors
/// `ServiceError::UploadRejected` naming the content type when it is not an
/// accepted image format.
pub fn ensure_supported_content_type(content_type: &str) -> ServiceResult<()> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if ALLOWED_PHOTO_CONTENT_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(ServiceError::UploadRejected(format!(
            "Unsupported file type: {content_type}"
        )))
    }
}
