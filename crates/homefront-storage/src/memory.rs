use crate::keys::object_location;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::memory::InMemory;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, GetResult, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::sync::Arc;

/// In-memory storage, for dry runs and tests
///
/// Objects live for as long as the instance (or any clone of it) does.
#[derive(Clone)]
pub struct MemoryStorage {
    store: Arc<InMemory>,
    base_url: String,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("memory://homefront")
    }
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            base_url: base_url.into(),
        }
    }

    async fn get(&self, storage_key: &str) -> StorageResult<GetResult> {
        let location = object_location(storage_key)?;
        self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })
    }

    /// Bytes stored under `storage_key`.
    pub async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let bytes = self
            .get(storage_key)
            .await?
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Content type recorded for `storage_key`.
    pub async fn content_type(&self, storage_key: &str) -> StorageResult<Option<String>> {
        let result = self.get(storage_key).await?;
        Ok(result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| AsRef::<str>::as_ref(v).to_string()))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let size = data.len();
        let location = object_location(storage_key)?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(Bytes::from(data)), opts)
            .await;
        result.map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::debug!(key = %storage_key, size_bytes = size, "Memory storage upload successful");

        Ok(self.public_url(storage_key))
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
