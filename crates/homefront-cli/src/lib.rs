use anyhow::Context;
use homefront_upload::{BatchReport, ImageAsset};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Log output format for CLI binaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so stdout stays clean for the report.
pub fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// One asset per path, named after the path's final component.
pub fn assets_from_paths(paths: &[PathBuf]) -> Vec<ImageAsset> {
    paths.iter().map(|p| ImageAsset::from_path(p)).collect()
}

/// Read a JSON array of assets (`[{"uri": ..., "fileName": ...}, ...]`).
pub fn load_manifest(path: &Path) -> anyhow::Result<Vec<ImageAsset>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Read manifest {}", path.display()))?;
    let assets: Vec<ImageAsset> = serde_json::from_str(&raw)
        .with_context(|| format!("Parse manifest {}", path.display()))?;
    Ok(assets)
}

/// Per-item report, in input order.
pub fn report_json(report: &BatchReport) -> Value {
    let items: Vec<Value> = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(object) => json!({
                "index": outcome.index,
                "file_name": outcome.file_name,
                "status": "uploaded",
                "key": object.key,
                "url": object.url,
                "content_type": object.content_type,
                "size_bytes": object.size_bytes,
            }),
            Err(failure) => json!({
                "index": outcome.index,
                "file_name": outcome.file_name,
                "status": "skipped",
                "stage": failure.stage().to_string(),
                "error": failure.to_string(),
            }),
        })
        .collect();

    json!({
        "succeeded": report.succeeded(),
        "failed": report.failed(),
        "items": items,
    })
}
