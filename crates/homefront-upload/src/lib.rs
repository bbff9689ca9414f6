//! Homefront Upload Library
//!
//! Batch upload of locally picked listing photos to the object store.
//!
//! Each asset runs through three stages:
//!
//! 1. [`AssetValidator`]: the asset has a handle, an allowed image extension and
//!    still exists on disk.
//! 2. [`ContentDecoder`]: the asset is read as base64 text and decoded back to
//!    its exact bytes.
//! 3. [`RemoteUploader`]: the bytes are put under the derived key and the public
//!    URL is returned.
//!
//! [`UploadPipeline`] drives the stages per item. A failing item is skipped and
//! the batch carries on; successful URLs come back in input order.

pub mod decoder;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod source;
pub mod uploader;
pub mod validator;

// Re-export commonly used types
pub use decoder::{decode_base64, encode_base64, ContentDecoder};
pub use error::{DecodeError, IneligibleAsset, Stage, UploadFailure};
pub use homefront_core::ImageAsset;
pub use outcome::{BatchReport, ItemOutcome, UploadedObject};
pub use pipeline::{upload_with_config, PipelineOptions, UploadPipeline};
pub use source::{AssetSource, LocalAssetSource};
pub use uploader::RemoteUploader;
pub use validator::{AssetValidator, ValidatedAsset};
