//! Shared key derivation for storage backends.
//!
//! Key format: the declared file name with every `' '` replaced by `'_'`.
//! Existing objects were written under this exact layout, so nothing else in the
//! name is touched.

use sha2::{Digest, Sha256};

#[cfg(any(feature = "storage-s3", feature = "storage-memory"))]
use crate::traits::{StorageError, StorageResult};

/// Derive the object key for a declared file name.
///
/// Pure and deterministic. Only the space character is rewritten; tabs, case and
/// any other characters pass through unchanged.
pub fn derive_upload_key(file_name: &str) -> String {
    file_name.replace(' ', "_")
}

/// Derive a key that also encodes the payload's content.
///
/// The first `hash_len` hex characters of the SHA-256 digest are inserted before
/// the extension: `Front Yard.jpg` becomes `Front_Yard-1a2b3c4d5e6f.jpg`. Names
/// without an extension get the digest appended.
pub fn content_hash_key(file_name: &str, data: &[u8], hash_len: usize) -> String {
    let base = derive_upload_key(file_name);
    let digest = hex::encode(Sha256::digest(data));
    let short = &digest[..hash_len.min(digest.len())];

    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, short, ext),
        _ => format!("{}-{}", base, short),
    }
}

/// Object store location for `storage_key`, byte-identical to the key.
///
/// `Path::from` percent-encodes characters such as `#`, `[` or `~`, which would
/// store the object under a different key than the URL names. Keys that cannot
/// be represented verbatim (empty segments, `.`/`..` segments, control
/// characters, leading or trailing `/`) are rejected instead.
#[cfg(any(feature = "storage-s3", feature = "storage-memory"))]
pub fn object_location(storage_key: &str) -> StorageResult<object_store::path::Path> {
    let location = object_store::path::Path::parse(storage_key)
        .map_err(|e| StorageError::InvalidKey(format!("{}: {}", storage_key, e)))?;

    if storage_key.is_empty() || location.as_ref() != storage_key {
        return Err(StorageError::InvalidKey(format!(
            "{} cannot be stored verbatim",
            storage_key
        )));
    }

    Ok(location)
}
