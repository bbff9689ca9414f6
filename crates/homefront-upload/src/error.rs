//! Per-item failure taxonomy.
//!
//! None of these abort a batch. They are logged where they happen and carried
//! in the item's outcome.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use homefront_storage::StorageError;

/// Why an asset was not eligible for upload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IneligibleAsset {
    #[error("Asset has no resource handle")]
    MissingHandle,

    #[error("Asset has no declared file name")]
    MissingName,

    #[error("File name has no extension: {file_name}")]
    MissingExtension { file_name: String },

    #[error("Unsupported file extension: {extension} (allowed: {allowed:?})")]
    UnsupportedExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Resource not found or unreadable: {uri}")]
    NotFound { uri: String },
}

/// Why an eligible asset's content could not be turned into a payload
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Failed to read asset content: {0}")]
    Read(#[source] std::io::Error),

    #[error("Asset content is empty")]
    Empty,

    #[error("Malformed base64 content: {0}")]
    Malformed(#[source] base64::DecodeError),

    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },
}

/// Pipeline stage an item failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Decode,
    Upload,
    Batch,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Stage::Validate => write!(f, "validate"),
            Stage::Decode => write!(f, "decode"),
            Stage::Upload => write!(f, "upload"),
            Stage::Batch => write!(f, "batch"),
        }
    }
}

/// Failure of a single item
#[derive(Debug, thiserror::Error)]
pub enum UploadFailure {
    #[error("Ineligible asset: {0}")]
    Ineligible(#[from] IneligibleAsset),

    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Transfer failed: {0}")]
    Transfer(#[from] StorageError),

    #[error("Timed out after {after:?}")]
    TimedOut { after: Duration },

    #[error("Batch cancelled before the item completed")]
    Cancelled,
}

impl UploadFailure {
    /// Stage the failure belongs to
    pub fn stage(&self) -> Stage {
        match self {
            UploadFailure::Ineligible(_) => Stage::Validate,
            UploadFailure::Decode(_) => Stage::Decode,
            UploadFailure::Transfer(_) => Stage::Upload,
            UploadFailure::TimedOut { .. } | UploadFailure::Cancelled => Stage::Batch,
        }
    }
}
