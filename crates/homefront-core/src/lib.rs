//! Homefront Core Library
//!
//! This crate provides the domain types, configuration and constants shared by the
//! storage backends, the upload pipeline and the command-line tools.

pub mod config;
pub mod constants;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, KeyStrategy, StorageConfig, UploadSettings};
pub use models::ImageAsset;
pub use storage_types::StorageBackend;
