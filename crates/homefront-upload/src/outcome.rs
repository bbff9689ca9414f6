//! Per-item and per-batch results.

use homefront_core::ImageAsset;

use crate::error::UploadFailure;

/// Where a successfully uploaded payload landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub key: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: usize,
}

/// Result of one input item
#[derive(Debug)]
pub struct ItemOutcome {
    /// Position of the asset in the input slice.
    pub index: usize,
    pub file_name: Option<String>,
    pub result: Result<UploadedObject, UploadFailure>,
}

impl ItemOutcome {
    pub(crate) fn new(
        index: usize,
        asset: &ImageAsset,
        result: Result<UploadedObject, UploadFailure>,
    ) -> Self {
        Self {
            index,
            file_name: asset.file_name.clone(),
            result,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn url(&self) -> Option<&str> {
        self.result.as_ref().ok().map(|o| o.url.as_str())
    }

    pub fn failure(&self) -> Option<&UploadFailure> {
        self.result.as_ref().err()
    }
}

/// Every item's outcome, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// URLs of the successful items, in input order.
    pub fn urls(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|o| o.url().map(String::from))
            .collect()
    }

    pub fn into_urls(self) -> Vec<String> {
        self.outcomes
            .into_iter()
            .filter_map(|o| o.result.ok().map(|obj| obj.url))
            .collect()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}
