use homefront_core::constants::CONTENT_HASH_KEY_LEN;
use homefront_core::KeyStrategy;
use homefront_storage::{content_hash_key, derive_upload_key, Storage, StorageResult};
use std::sync::Arc;

use crate::outcome::UploadedObject;
use crate::validator::ValidatedAsset;

/// Puts decoded payloads into the object store
///
/// One put per payload. No chunking, multipart or retry.
#[derive(Clone)]
pub struct RemoteUploader {
    storage: Arc<dyn Storage>,
    key_strategy: KeyStrategy,
}

impl RemoteUploader {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            key_strategy: KeyStrategy::Name,
        }
    }

    pub fn with_key_strategy(mut self, key_strategy: KeyStrategy) -> Self {
        self.key_strategy = key_strategy;
        self
    }

    pub fn key_strategy(&self) -> KeyStrategy {
        self.key_strategy
    }

    /// Object key for an asset's payload under the configured strategy
    pub fn key_for(&self, asset: &ValidatedAsset, data: &[u8]) -> String {
        match self.key_strategy {
            KeyStrategy::Name => derive_upload_key(&asset.file_name),
            KeyStrategy::ContentHash => {
                content_hash_key(&asset.file_name, data, CONTENT_HASH_KEY_LEN)
            }
        }
    }

    /// Upload the payload and return where it landed
    pub async fn upload(
        &self,
        asset: &ValidatedAsset,
        data: Vec<u8>,
    ) -> StorageResult<UploadedObject> {
        let key = self.key_for(asset, &data);
        let content_type = asset.content_type();
        let size_bytes = data.len();

        let url = self
            .storage
            .upload_with_key(&key, data, &content_type)
            .await?;

        Ok(UploadedObject {
            key,
            url,
            content_type,
            size_bytes,
        })
    }
}
