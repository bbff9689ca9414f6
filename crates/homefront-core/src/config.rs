//! Configuration module
//!
//! Storage and upload settings are read once at startup from the environment
//! (optionally seeded from a `.env` file) and stay read-only for the life of the
//! process.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_ITEM_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_MAX_PAYLOAD_MB,
};
use crate::storage_types::StorageBackend;

/// How upload keys are derived from declared file names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyStrategy {
    /// The declared name with spaces replaced by underscores.
    #[default]
    Name,
    /// The normalized name with a short content digest before the extension.
    ContentHash,
}

impl FromStr for KeyStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(KeyStrategy::Name),
            "content-hash" | "content_hash" | "hash" => Ok(KeyStrategy::ContentHash),
            _ => Err(anyhow::anyhow!("Invalid key strategy: {}", s)),
        }
    }
}

impl Display for KeyStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            KeyStrategy::Name => write!(f, "name"),
            KeyStrategy::ContentHash => write!(f, "content-hash"),
        }
    }
}

/// Object store connection settings
#[derive(Clone, Debug, Default)]
pub struct StorageConfig {
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

/// Batch upload behavior
#[derive(Clone, Debug)]
pub struct UploadSettings {
    pub allowed_extensions: Vec<String>,
    pub max_payload_bytes: usize,
    /// 0 disables the per-item timeout.
    pub item_timeout_secs: u64,
    pub max_concurrency: usize,
    pub key_strategy: KeyStrategy,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_MB * 1024 * 1024,
            item_timeout_secs: DEFAULT_ITEM_TIMEOUT_SECS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            key_strategy: KeyStrategy::Name,
        }
    }
}

impl UploadSettings {
    pub fn item_timeout(&self) -> Option<Duration> {
        (self.item_timeout_secs > 0).then(|| Duration::from_secs(self.item_timeout_secs))
    }
}

/// Application configuration
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub storage: StorageConfig,
    pub upload: UploadSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend = lookup("STORAGE_BACKEND")
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?;

        let storage = StorageConfig {
            storage_backend,
            s3_bucket: lookup("S3_BUCKET").filter(|s| !s.is_empty()),
            s3_region: lookup("S3_REGION").filter(|s| !s.is_empty()),
            s3_endpoint: lookup("S3_ENDPOINT").filter(|s| !s.is_empty()),
            aws_region: lookup("AWS_REGION").filter(|s| !s.is_empty()),
            local_storage_path: lookup("LOCAL_STORAGE_PATH").filter(|s| !s.is_empty()),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL").filter(|s| !s.is_empty()),
        };

        let allowed_extensions: Vec<String> = lookup("UPLOAD_ALLOWED_EXTENSIONS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.join(","))
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let max_payload_mb = lookup("UPLOAD_MAX_PAYLOAD_MB")
            .unwrap_or_else(|| DEFAULT_MAX_PAYLOAD_MB.to_string())
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_PAYLOAD_MB);

        let max_payload_bytes = max_payload_mb.checked_mul(1024 * 1024).ok_or_else(|| {
            anyhow::anyhow!("UPLOAD_MAX_PAYLOAD_MB is too large: {}", max_payload_mb)
        })?;

        let upload = UploadSettings {
            allowed_extensions,
            max_payload_bytes,
            item_timeout_secs: lookup("UPLOAD_ITEM_TIMEOUT_SECS")
                .unwrap_or_else(|| DEFAULT_ITEM_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_ITEM_TIMEOUT_SECS),
            max_concurrency: lookup("UPLOAD_MAX_CONCURRENCY")
                .unwrap_or_else(|| DEFAULT_MAX_CONCURRENCY.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_CONCURRENCY),
            key_strategy: lookup("UPLOAD_KEY_STRATEGY")
                .map(|s| s.parse::<KeyStrategy>())
                .transpose()?
                .unwrap_or_default(),
        };

        let config = Config { storage, upload };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "UPLOAD_ALLOWED_EXTENSIONS must list at least one extension"
            ));
        }

        if self.upload.max_concurrency == 0 {
            return Err(anyhow::anyhow!("UPLOAD_MAX_CONCURRENCY must be at least 1"));
        }

        if self.upload.max_payload_bytes == 0 {
            return Err(anyhow::anyhow!("UPLOAD_MAX_PAYLOAD_MB must be at least 1"));
        }

        match self.storage_backend() {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region().is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        Ok(())
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.storage_backend.unwrap_or(StorageBackend::S3)
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.storage.s3_bucket.as_deref()
    }

    /// `S3_REGION`, falling back to `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.storage
            .s3_region
            .as_deref()
            .or(self.storage.aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.storage.s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.storage.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.storage.local_storage_base_url.as_deref()
    }

    pub fn upload(&self) -> &UploadSettings {
        &self.upload
    }
}
