//! Fakes for the two capabilities the pipeline depends on.

#![allow(dead_code)]

use async_trait::async_trait;
use homefront_storage::s3::s3_public_url;
use homefront_storage::{Storage, StorageBackend, StorageError, StorageResult};
use homefront_upload::{encode_base64, AssetSource};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const BUCKET: &str = "homefront-listings";
pub const REGION: &str = "us-east-1";

/// One recorded put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Put {
    pub key: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Object store fake that records puts and can fail or stall chosen keys.
#[derive(Default)]
pub struct RecordingStorage {
    puts: Mutex<Vec<Put>>,
    attempts: AtomicUsize,
    fail_keys: HashSet<String>,
    fail_first: AtomicUsize,
    stall_keys: HashSet<String>,
    delay: Option<Duration>,
    key_delays: HashMap<String, Duration>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every put to `key` fails.
    pub fn failing(mut self, key: &str) -> Self {
        self.fail_keys.insert(key.to_string());
        self
    }

    /// The first `n` put attempts fail, whatever their key.
    pub fn failing_first(self, n: usize) -> Self {
        self.fail_first.store(n, Ordering::SeqCst);
        self
    }

    /// Puts to `key` never complete.
    pub fn stalling(mut self, key: &str) -> Self {
        self.stall_keys.insert(key.to_string());
        self
    }

    /// Every put sleeps before completing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Puts to `key` sleep for `delay` before completing.
    pub fn with_delay_for(mut self, key: &str, delay: Duration) -> Self {
        self.key_delays.insert(key.to_string(), delay);
        self
    }

    pub fn puts(&self) -> Vec<Put> {
        self.puts.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn url(key: &str) -> String {
        s3_public_url(BUCKET, REGION, None, key)
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.key_delays.get(storage_key).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }
        if self.stall_keys.contains(storage_key) {
            futures::future::pending::<()>().await;
        }

        let fail_first = self
            .fail_first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail_first || self.fail_keys.contains(storage_key) {
            return Err(StorageError::UploadFailed(format!(
                "503 Slow Down: {}",
                storage_key
            )));
        }

        self.puts.lock().unwrap().push(Put {
            key: storage_key.to_string(),
            content_type: content_type.to_string(),
            data,
        });
        Ok(self.public_url(storage_key))
    }

    fn public_url(&self, storage_key: &str) -> String {
        Self::url(storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Asset source fake backed by a map of handle to raw content.
#[derive(Default)]
pub struct FakeSource {
    files: HashMap<String, String>,
    exists_calls: AtomicUsize,
    read_calls: AtomicUsize,
    reads: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file whose bytes are served base64 encoded.
    pub fn with_file(mut self, uri: &str, data: &[u8]) -> Self {
        self.files.insert(uri.to_string(), encode_base64(data));
        self
    }

    /// Register a file whose read returns `text` verbatim.
    pub fn with_raw_text(mut self, uri: &str, text: &str) -> Self {
        self.files.insert(uri.to_string(), text.to_string());
        self
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetSource for FakeSource {
    async fn exists(&self, uri: &str) -> bool {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.files.contains_key(uri)
    }

    async fn read_base64(&self, uri: &str) -> std::io::Result<String> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.reads.lock().unwrap().push(uri.to_string());
        self.files
            .get(uri)
            .cloned()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, uri.to_string()))
    }
}
