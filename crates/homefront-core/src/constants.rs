//! Defaults shared by configuration and the upload pipeline.

/// Image extensions accepted for upload when none are configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Largest decoded payload a single put accepts, in megabytes.
pub const DEFAULT_MAX_PAYLOAD_MB: usize = 10;

/// Upper bound on one item's validate/decode/upload chain.
pub const DEFAULT_ITEM_TIMEOUT_SECS: u64 = 120;

/// Items in flight at once. 1 keeps the batch strictly sequential.
pub const DEFAULT_MAX_CONCURRENCY: usize = 1;

/// Hex characters of the SHA-256 digest used by the content-hash key strategy.
pub const CONTENT_HASH_KEY_LEN: usize = 12;
