//! Homefront CLI: upload listing photos from the command line.
//!
//! Storage is configured from the environment (STORAGE_BACKEND, S3_BUCKET,
//! S3_REGION, ...); see `homefront_core::Config`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use homefront_cli::{assets_from_paths, init_tracing, load_manifest, report_json, LogFormat};
use homefront_core::Config;
use homefront_upload::{LocalAssetSource, UploadPipeline};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "homefront", about = "Homefront listing photo uploader")]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload image files and print their public URLs
    Upload {
        /// Image files to upload
        #[arg(required_unless_present = "manifest", conflicts_with = "manifest")]
        files: Vec<PathBuf>,
        /// JSON array of assets ({"uri", "fileName"}) instead of file paths
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Print a per-item report instead of the URL list
        #[arg(long)]
        json: bool,
        /// Items uploaded at once (overrides UPLOAD_MAX_CONCURRENCY)
        #[arg(long)]
        concurrency: Option<usize>,
        /// Per-item timeout in seconds, 0 to disable (overrides UPLOAD_ITEM_TIMEOUT_SECS)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_tracing(cli.log_format);

    let mut config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Upload {
            files,
            manifest,
            json,
            concurrency,
            timeout_secs,
        } => {
            if let Some(concurrency) = concurrency {
                config.upload.max_concurrency = concurrency;
            }
            if let Some(timeout_secs) = timeout_secs {
                config.upload.item_timeout_secs = timeout_secs;
            }
            config.validate().context("Invalid upload settings")?;

            let assets = match manifest {
                Some(path) => load_manifest(&path)?,
                None => assets_from_paths(&files),
            };

            let pipeline = UploadPipeline::from_config(&config, Arc::new(LocalAssetSource::new()))
                .await
                .with_context(|| {
                    format!(
                        "Failed to create {} storage client",
                        config.storage_backend()
                    )
                })?;

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, cancelling upload batch");
                    on_interrupt.cancel();
                }
            });

            let report = pipeline.upload_until_cancelled(&assets, cancel).await;

            if json {
                print_json(&report_json(&report))?;
            } else {
                print_json(&report.urls())?;
            }
        }
    }

    Ok(())
}
