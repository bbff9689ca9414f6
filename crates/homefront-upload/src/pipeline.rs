//! Upload pipeline: validate → decode → upload, per item.
//!
//! Items are independent. A failure in any stage abandons that item only; the
//! batch moves on to the next one. With the default options items run strictly
//! one after another. Raising `max_concurrency` overlaps items but results still
//! come back in input order.

use futures::stream::{self, StreamExt};
use homefront_core::{Config, ImageAsset, KeyStrategy, UploadSettings};
use homefront_storage::{create_storage, derive_upload_key, Storage, StorageResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::decoder::ContentDecoder;
use crate::error::{Stage, UploadFailure};
use crate::outcome::{BatchReport, ItemOutcome, UploadedObject};
use crate::source::AssetSource;
use crate::uploader::RemoteUploader;
use crate::validator::AssetValidator;

/// Scheduling limits for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Bound on one item's whole validate/decode/upload chain. `None` waits forever.
    pub item_timeout: Option<Duration>,
    /// Items in flight at once; values below 1 are treated as 1.
    pub max_concurrency: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&UploadSettings::default())
    }
}

impl From<&UploadSettings> for PipelineOptions {
    fn from(settings: &UploadSettings) -> Self {
        Self {
            item_timeout: settings.item_timeout(),
            max_concurrency: settings.max_concurrency,
        }
    }
}

/// Batch upload orchestrator
///
/// The store client and the asset source are injected and shared read-only by
/// every item and every batch.
pub struct UploadPipeline {
    validator: AssetValidator,
    decoder: ContentDecoder,
    uploader: RemoteUploader,
    source: Arc<dyn AssetSource>,
    options: PipelineOptions,
}

impl UploadPipeline {
    /// Pipeline with default stages and options
    pub fn new(storage: Arc<dyn Storage>, source: Arc<dyn AssetSource>) -> Self {
        Self {
            validator: AssetValidator::default(),
            decoder: ContentDecoder::default(),
            uploader: RemoteUploader::new(storage),
            source,
            options: PipelineOptions::default(),
        }
    }

    /// Pipeline configured from upload settings
    pub fn with_settings(
        storage: Arc<dyn Storage>,
        source: Arc<dyn AssetSource>,
        settings: &UploadSettings,
    ) -> Self {
        Self {
            validator: AssetValidator::new(settings.allowed_extensions.clone()),
            decoder: ContentDecoder::new(settings.max_payload_bytes),
            uploader: RemoteUploader::new(storage).with_key_strategy(settings.key_strategy),
            source,
            options: PipelineOptions::from(settings),
        }
    }

    /// Build the store client from configuration, then the pipeline
    pub async fn from_config(config: &Config, source: Arc<dyn AssetSource>) -> StorageResult<Self> {
        let storage = create_storage(config).await?;
        Ok(Self::with_settings(storage, source, config.upload()))
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Upload a batch and return the URLs of the items that succeeded.
    ///
    /// Failed items are omitted; order among the rest follows the input.
    pub async fn upload(&self, assets: &[ImageAsset]) -> Vec<String> {
        self.upload_detailed(assets).await.into_urls()
    }

    /// Upload a batch and return every item's outcome, in input order.
    pub async fn upload_detailed(&self, assets: &[ImageAsset]) -> BatchReport {
        self.upload_until_cancelled(assets, CancellationToken::new())
            .await
    }

    /// Upload a batch until `cancel` fires.
    ///
    /// Once cancelled no further item starts and items in flight are dropped;
    /// every item without a result is reported as `Cancelled`.
    pub async fn upload_until_cancelled(
        &self,
        assets: &[ImageAsset],
        cancel: CancellationToken,
    ) -> BatchReport {
        if assets.is_empty() {
            return BatchReport::empty();
        }

        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("upload_batch", batch_id = %batch_id, items = assets.len());

        async {
            self.warn_on_duplicate_keys(assets);

            let mut outcomes = Vec::with_capacity(assets.len());
            let mut items = std::pin::pin!(stream::iter(assets.iter().enumerate())
                .map(|(index, asset)| self.run_item(index, asset))
                .buffered(self.options.max_concurrency.max(1)));

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::warn!(
                            completed = outcomes.len(),
                            remaining = assets.len() - outcomes.len(),
                            "Upload batch cancelled"
                        );
                        break;
                    }
                    next = items.next() => match next {
                        Some(outcome) => outcomes.push(outcome),
                        None => break,
                    },
                }
            }

            // `buffered` yields in input order, so everything from here on never finished.
            let done = outcomes.len();
            outcomes.extend(
                assets
                    .iter()
                    .enumerate()
                    .skip(done)
                    .map(|(index, asset)| {
                        ItemOutcome::new(index, asset, Err(UploadFailure::Cancelled))
                    }),
            );

            let report = BatchReport { outcomes };
            tracing::info!(
                succeeded = report.succeeded(),
                failed = report.failed(),
                "Upload batch finished"
            );
            report
        }
        .instrument(span)
        .await
    }

    async fn run_item(&self, index: usize, asset: &ImageAsset) -> ItemOutcome {
        let span = tracing::info_span!("upload_item", index, file_name = %asset.display_name());

        async {
            let start = std::time::Instant::now();
            let result = match self.options.item_timeout {
                Some(limit) => tokio::time::timeout(limit, self.process_item(index, asset))
                    .await
                    .unwrap_or(Err(UploadFailure::TimedOut { after: limit })),
                None => self.process_item(index, asset).await,
            };

            match &result {
                Ok(object) => tracing::info!(
                    key = %object.key,
                    url = %object.url,
                    size_bytes = object.size_bytes,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Asset uploaded"
                ),
                Err(failure) if failure.stage() == Stage::Upload => tracing::error!(
                    error = %failure,
                    stage = %failure.stage(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Asset skipped"
                ),
                Err(failure) => tracing::warn!(
                    error = %failure,
                    stage = %failure.stage(),
                    "Asset skipped"
                ),
            }

            ItemOutcome::new(index, asset, result)
        }
        .instrument(span)
        .await
    }

    async fn process_item(
        &self,
        index: usize,
        asset: &ImageAsset,
    ) -> Result<UploadedObject, UploadFailure> {
        let validated = self
            .validator
            .validate(index, asset, self.source.as_ref())
            .await?;
        let data = self
            .decoder
            .decode(&validated, self.source.as_ref())
            .await?;
        let object = self.uploader.upload(&validated, data).await?;
        Ok(object)
    }

    /// Keys that more than one eligible asset in the batch will be put under.
    ///
    /// Only the name strategy can collide; content-hash keys differ whenever the
    /// payloads do.
    fn overwritten_keys(&self, assets: &[ImageAsset]) -> Vec<(String, Vec<usize>)> {
        match self.uploader.key_strategy() {
            KeyStrategy::Name => duplicate_keys(assets, &self.validator),
            KeyStrategy::ContentHash => Vec::new(),
        }
    }

    /// Warn when two assets in one batch map to the same name-derived key.
    ///
    /// The later upload overwrites the earlier object.
    fn warn_on_duplicate_keys(&self, assets: &[ImageAsset]) {
        for (key, indices) in self.overwritten_keys(assets) {
            tracing::warn!(
                key = %key,
                indices = ?indices,
                "Assets share an upload key; later uploads overwrite earlier ones"
            );
        }
    }
}

/// Name-derived keys claimed by more than one asset, with the claiming indices.
///
/// Assets the validator rejects without touching the source (no handle, no
/// name, extension not allowed) never reach the store and are not counted.
pub fn duplicate_keys(
    assets: &[ImageAsset],
    validator: &AssetValidator,
) -> Vec<(String, Vec<usize>)> {
    let mut seen: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, asset) in assets.iter().enumerate() {
        let eligible = validator.validate_handle(asset).is_ok()
            && validator.validate_extension(asset).is_ok();
        if !eligible {
            continue;
        }
        seen.entry(derive_upload_key(asset.display_name()))
            .or_default()
            .push(index);
    }

    let mut dups: Vec<(String, Vec<usize>)> = seen
        .into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .collect();
    dups.sort_by_key(|(_, indices)| indices[0]);
    dups
}

/// Build the store from configuration and upload a batch.
///
/// Fail-soft: if the store client cannot be built the error is logged and an
/// empty list is returned, the same as a batch in which everything failed.
pub async fn upload_with_config(
    config: &Config,
    source: Arc<dyn AssetSource>,
    assets: &[ImageAsset],
) -> Vec<String> {
    if assets.is_empty() {
        return Vec::new();
    }

    match UploadPipeline::from_config(config, source).await {
        Ok(pipeline) => pipeline.upload(assets).await,
        Err(e) => {
            tracing::error!(
                error = %e,
                backend = %config.storage_backend(),
                items = assets.len(),
                "Failed to create storage client, no assets uploaded"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_from_settings() {
        let settings = UploadSettings {
            item_timeout_secs: 0,
            max_concurrency: 3,
            ..Default::default()
        };
        let options = PipelineOptions::from(&settings);
        assert_eq!(options.item_timeout, None);
        assert_eq!(options.max_concurrency, 3);

        let defaults = PipelineOptions::default();
        assert_eq!(defaults.item_timeout, Some(Duration::from_secs(120)));
        assert_eq!(defaults.max_concurrency, 1);
    }

    #[test]
    fn finds_duplicate_keys() {
        let assets = vec![
            ImageAsset::new("/a", "Front Yard.jpg"),
            ImageAsset::new("/b", "Back.png"),
            ImageAsset::new("/c", "Front_Yard.jpg"),
            ImageAsset::new("/d", "Back.png"),
            ImageAsset::new("/e", "Unique.png"),
        ];
        assert_eq!(
            duplicate_keys(&assets, &AssetValidator::default()),
            vec![
                ("Front_Yard.jpg".to_string(), vec![0, 2]),
                ("Back.png".to_string(), vec![1, 3]),
            ]
        );
    }

    #[test]
    fn rejected_assets_do_not_count_as_duplicates() {
        let assets = vec![
            ImageAsset::new("/a", "clip.gif"),
            ImageAsset::new("/b", "clip.gif"),
            ImageAsset::new("", "a.png"),
            ImageAsset::new("/c", "a.png"),
            ImageAsset {
                uri: "/d".to_string(),
                ..Default::default()
            },
        ];
        assert!(duplicate_keys(&assets, &AssetValidator::default()).is_empty());
    }

    #[test]
    fn content_hash_strategy_never_overwrites() {
        let assets = vec![
            ImageAsset::new("/a", "Front Yard.jpg"),
            ImageAsset::new("/b", "Front Yard.jpg"),
        ];
        let storage = Arc::new(homefront_storage::MemoryStorage::default());
        let source = Arc::new(crate::source::LocalAssetSource::new());

        let by_name = UploadPipeline::new(storage.clone(), source.clone());
        assert_eq!(by_name.overwritten_keys(&assets).len(), 1);

        let settings = UploadSettings {
            key_strategy: KeyStrategy::ContentHash,
            ..Default::default()
        };
        let by_hash = UploadPipeline::with_settings(storage, source, &settings);
        assert!(by_hash.overwritten_keys(&assets).is_empty());
    }
}
