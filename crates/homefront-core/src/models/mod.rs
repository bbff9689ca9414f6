//! Data models shared across the upload components.

mod asset;

pub use asset::ImageAsset;
