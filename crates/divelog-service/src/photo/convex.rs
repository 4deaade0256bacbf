use async_trait::async_trait;
use divelog_core::config::PhotoConfig;
use reqwest::{StatusCode, header};
use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};
use crate::photo::{PhotoContent, PhotoStore, StorageId, UploadTarget};

/// Photo store on a Convex deployment. The upload URL comes from a Convex
/// function; stored files are addressed through the storage HTTP API.
#[derive(Debug, Clone)]
pub struct ConvexPhotoStore {
    client: reqwest::Client,
    deployment_url: String,
    auth_token: Option<String>,
    upload_function: String,
}

#[derive(Debug, Deserialize)]
struct FunctionResponse {
    value: Option<serde_json::Value>,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StorageMetadata {
    #[serde(rename = "contentType")]
    content_type: Option<String>,
    size: Option<u64>,
}

impl StorageMetadata {
    /// Every stored photo passed the upload type check, so a missing type
    /// means the store and this service disagree.
    fn required_content_type(&self) -> ServiceResult<String> {
        self.content_type
            .clone()
            .filter(|content_type| !content_type.is_empty())
            .ok_or(ServiceError::InvariantViolation(
                "stored photo has no content type",
            ))
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "storageId")]
    storage_id: Option<String>,
}

impl ConvexPhotoStore {
    /// ## Errors
    /// Returns `ServiceError::InvalidConfiguration` if no deployment URL is
    /// configured or the HTTP client cannot be built.
    pub fn new(config: &PhotoConfig) -> ServiceResult<Self> {
        let deployment_url = config
            .deployment_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                ServiceError::InvalidConfiguration("photos.deployment_url is not set".to_string())
            })?
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ServiceError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            client,
            deployment_url,
            auth_token: config
                .auth_token
                .as_deref()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(ToString::to_string),
            upload_function: config.upload_function.trim_matches('/').to_string(),
        })
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn storage_url(&self, storage_id: &StorageId) -> String {
        format!("{}/api/storage/{storage_id}", self.deployment_url)
    }

    /// Malformed references are reported as not found without a request.
    async fn metadata(&self, storage_id: &StorageId) -> ServiceResult<StorageMetadata> {
        if storage_id.as_str().trim().is_empty() || storage_id.as_str().contains('/') {
            return Err(not_found(storage_id));
        }

        let response = self
            .with_auth(
                self.client
                    .get(format!("{}/metadata", self.storage_url(storage_id))),
            )
            .send()
            .await
            .map_err(|e| unavailable("photo metadata request failed", &e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            return Err(not_found(storage_id));
        }
        if !status.is_success() {
            return Err(ServiceError::StoreUnavailable(format!(
                "photo metadata returned status {status}"
            )));
        }

        response
            .json::<Option<StorageMetadata>>()
            .await
            .map_err(|e| unavailable("photo metadata unreadable", &e))?
            .ok_or_else(|| not_found(storage_id))
    }
}

fn unavailable(context: &str, error: &reqwest::Error) -> ServiceError {
    ServiceError::StoreUnavailable(format!("{context}: {error}"))
}

fn not_found(storage_id: &StorageId) -> ServiceError {
    ServiceError::NotFound(format!("photo '{storage_id}'"))
}

#[async_trait]
impl PhotoStore for ConvexPhotoStore {
    #[tracing::instrument(skip(self))]
    async fn request_upload_target(&self) -> ServiceResult<UploadTarget> {
        let request = self
            .client
            .post(format!(
                "{}/api/run/{}",
                self.deployment_url, self.upload_function
            ))
            .json(&serde_json::json!({ "args": {}, "format": "json" }));

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(|e| unavailable("upload URL request failed", &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::StoreUnavailable(format!(
                "upload URL request returned status {status}"
            )));
        }

        let body: FunctionResponse = response
            .json()
            .await
            .map_err(|e| unavailable("upload URL response unreadable", &e))?;

        match body.value {
            Some(serde_json::Value::String(url)) if !url.is_empty() => Ok(UploadTarget::new(url)),
            _ => Err(ServiceError::StoreUnavailable(format!(
                "no upload URL returned{}",
                body.error_message
                    .map(|msg| format!(": {msg}"))
                    .unwrap_or_default()
            ))),
        }
    }

    #[tracing::instrument(skip(self, target, bytes), fields(size = bytes.len()))]
    async fn finalize(
        &self,
        target: UploadTarget,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ServiceResult<StorageId> {
        let response = self
            .client
            .post(target.as_str())
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| unavailable("photo upload failed", &e))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(ServiceError::UploadRejected(format!(
                "photo store rejected the upload with status {status}"
            )));
        }
        if !status.is_success() {
            return Err(ServiceError::StoreUnavailable(format!(
                "photo upload returned status {status}"
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| unavailable("photo upload response unreadable", &e))?;

        let storage_id = body
            .storage_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ServiceError::StoreUnavailable("no storageId returned".to_string()))?;

        tracing::info!(storage_id = %storage_id, "Photo stored");
        Ok(StorageId::new(storage_id))
    }

    #[tracing::instrument(skip(self))]
    async fn resolve_url(&self, storage_id: &StorageId) -> ServiceResult<String> {
        self.metadata(storage_id).await?;
        Ok(self.storage_url(storage_id))
    }

    #[tracing::instrument(skip(self))]
    async fn download(&self, storage_id: &StorageId) -> ServiceResult<PhotoContent> {
        let metadata = self.metadata(storage_id).await?;
        let content_type = metadata.required_content_type()?;

        let response = self
            .with_auth(self.client.get(self.storage_url(storage_id)))
            .send()
            .await
            .map_err(|e| unavailable("photo download failed", &e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(not_found(storage_id));
        }
        if !status.is_success() {
            return Err(ServiceError::StoreUnavailable(format!(
                "photo download returned status {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| unavailable("photo download interrupted", &e))?
            .to_vec();

        if let Some(size) = metadata.size
            && u64::try_from(bytes.len()).ok() != Some(size)
        {
            tracing::warn!(expected = size, actual = bytes.len(), "Photo size differs from metadata");
        }

        Ok(PhotoContent {
            content_type,
            bytes,
        })
    }
}
