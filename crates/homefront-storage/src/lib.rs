//! Homefront Storage Library
//!
//! This crate provides the object-store capability the upload pipeline writes to:
//! the `Storage` trait and its S3, local filesystem and in-memory implementations.
//!
//! # Storage key format
//!
//! Keys are the declared file name with every space replaced by an underscore
//! (`Front Yard.jpg` becomes `Front_Yard.jpg`). On S3 the object is then served
//! from `https://{bucket}.s3.{region}.amazonaws.com/{key}`. Key derivation lives
//! in the `keys` module so every backend and caller agrees on it.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use homefront_core::StorageBackend;
pub use keys::{content_hash_key, derive_upload_key};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
