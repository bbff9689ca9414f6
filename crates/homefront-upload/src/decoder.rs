//! Content decoding: base64 text from the asset source back to raw bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use homefront_core::constants::DEFAULT_MAX_PAYLOAD_MB;

use crate::error::DecodeError;
use crate::source::AssetSource;
use crate::validator::ValidatedAsset;

/// Encode bytes with the standard padded base64 alphabet.
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard padded base64, ignoring ASCII whitespace.
///
/// Lossless: `decode_base64(&encode_base64(b)) == b` for every `b`, including the
/// empty slice. Bad characters, bad length or non-canonical padding are
/// `DecodeError::Malformed`.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, DecodeError> {
    let result = if text.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(compact)
    } else {
        STANDARD.decode(text)
    };
    result.map_err(DecodeError::Malformed)
}

/// Size `text` decodes to when it is well-formed base64, without decoding it.
fn decoded_len(text: &str) -> usize {
    let (len, padding) = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .fold((0usize, 0usize), |(len, padding), b| {
            (len + 1, padding + usize::from(b == b'='))
        });
    (len / 4 * 3).saturating_sub(padding)
}

/// Turns a validated asset into an in-memory payload
#[derive(Debug, Clone)]
pub struct ContentDecoder {
    max_payload_bytes: usize,
}

impl Default for ContentDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD_MB * 1024 * 1024)
    }
}

impl ContentDecoder {
    pub fn new(max_payload_bytes: usize) -> Self {
        Self { max_payload_bytes }
    }

    /// Read the asset's full content and decode it.
    ///
    /// An empty read counts as a failure even though the asset passed the
    /// existence check. The source asset is never modified.
    pub async fn decode(
        &self,
        asset: &ValidatedAsset,
        source: &dyn AssetSource,
    ) -> Result<Vec<u8>, DecodeError> {
        let text = source
            .read_base64(&asset.uri)
            .await
            .map_err(DecodeError::Read)?;

        if text.trim().is_empty() {
            return Err(DecodeError::Empty);
        }

        // Reject oversize content before allocating the decoded copy.
        let size = decoded_len(&text);
        if size > self.max_payload_bytes {
            return Err(DecodeError::TooLarge {
                size,
                max: self.max_payload_bytes,
            });
        }

        let data = decode_base64(&text)?;

        if data.is_empty() {
            return Err(DecodeError::Empty);
        }

        if data.len() > self.max_payload_bytes {
            return Err(DecodeError::TooLarge {
                size: data.len(),
                max: self.max_payload_bytes,
            });
        }

        Ok(data)
    }
}
