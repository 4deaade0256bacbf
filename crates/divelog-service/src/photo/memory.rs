use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{ServiceError, ServiceResult};
use crate::photo::{PhotoContent, PhotoStore, StorageId, UploadTarget};

const MEMORY_URL_PREFIX: &str = "memory://photos";

/// Unfinished targets kept before the oldest is abandoned.
const MAX_OPEN_TARGETS: usize = 256;

#[derive(Debug, Default)]
struct MemoryPhotoState {
    open_targets: VecDeque<String>,
    photos: HashMap<String, PhotoContent>,
}

/// In-process photo store. Upload targets are single use.
#[derive(Debug)]
pub struct MemoryPhotoStore {
    max_bytes: usize,
    state: Mutex<MemoryPhotoState>,
}

impl MemoryPhotoStore {
    #[must_use]
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            state: Mutex::new(MemoryPhotoState::default()),
        }
    }

    #[must_use]
    pub fn get(&self, storage_id: &StorageId) -> Option<PhotoContent> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .photos
            .get(storage_id.as_str())
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .photos
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn request_upload_target(&self) -> ServiceResult<UploadTarget> {
        let target = format!("{MEMORY_URL_PREFIX}/upload/{}", uuid::Uuid::new_v4());
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.open_targets.len() >= MAX_OPEN_TARGETS
            && let Some(abandoned) = state.open_targets.pop_front()
        {
            tracing::debug!(upload_target = %abandoned, "Dropping unused upload target");
        }
        state.open_targets.push_back(target.clone());
        Ok(UploadTarget::new(target))
    }

    async fn finalize(
        &self,
        target: UploadTarget,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ServiceResult<StorageId> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(position) = state
            .open_targets
            .iter()
            .position(|open| open == target.as_str())
        else {
            return Err(ServiceError::UploadRejected(
                "upload target is unknown or already used".to_string(),
            ));
        };
        state.open_targets.remove(position);
        if bytes.is_empty() {
            return Err(ServiceError::UploadRejected("photo is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(ServiceError::UploadRejected(format!(
                "photo exceeds {} bytes",
                self.max_bytes
            )));
        }

        let storage_id = uuid::Uuid::now_v7().simple().to_string();
        state.photos.insert(
            storage_id.clone(),
            PhotoContent {
                content_type: content_type.to_string(),
                bytes,
            },
        );

        Ok(StorageId::new(storage_id))
    }

    async fn resolve_url(&self, storage_id: &StorageId) -> ServiceResult<String> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.photos.contains_key(storage_id.as_str()) {
            Ok(format!("{MEMORY_URL_PREFIX}/{storage_id}"))
        } else {
            Err(ServiceError::NotFound(format!("photo '{storage_id}'")))
        }
    }

    async fn download(&self, storage_id: &StorageId) -> ServiceResult<PhotoContent> {
        self.get(storage_id)
            .ok_or_else(|| ServiceError::NotFound(format!("photo '{storage_id}'")))
    }
}
