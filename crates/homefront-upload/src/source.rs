//! Filesystem capability the pipeline reads assets through.

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::PathBuf;
use tokio::fs;

use crate::decoder::encode_base64;

/// Read access to locally picked assets
///
/// Content is exposed as base64 text, the text-safe form platform pickers hand
/// out. The pipeline decodes it back to bytes.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Whether `uri` resolves to an existing readable resource right now.
    async fn exists(&self, uri: &str) -> bool;

    /// Full content of `uri`, base64 encoded.
    async fn read_base64(&self, uri: &str) -> io::Result<String>;
}

/// Assets on the local filesystem, addressed by plain path or `file://` URI
#[derive(Debug, Clone, Default)]
pub struct LocalAssetSource {
    root: Option<PathBuf>,
}

impl LocalAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative handles against `root` instead of the working directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Map a resource handle to a filesystem path.
    ///
    /// `file://` URIs are percent-decoded (`Front%20Yard.jpg`); plain paths are
    /// taken as-is.
    pub fn resolve(&self, uri: &str) -> PathBuf {
        let path = match uri.strip_prefix("file://") {
            Some(rest) => PathBuf::from(percent_decode_str(rest).decode_utf8_lossy().into_owned()),
            None => PathBuf::from(uri),
        };

        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

#[async_trait]
impl AssetSource for LocalAssetSource {
    async fn exists(&self, uri: &str) -> bool {
        let path = self.resolve(uri);
        match fs::metadata(&path).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }

    async fn read_base64(&self, uri: &str) -> io::Result<String> {
        let path = self.resolve(uri);
        let bytes = fs::read(&path).await?;
        Ok(encode_base64(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_base64;
    use tempfile::tempdir;

    #[test]
    fn resolves_file_uris() {
        let source = LocalAssetSource::new();
        assert_eq!(
            source.resolve("file:///photos/Front%20Yard.jpg"),
            PathBuf::from("/photos/Front Yard.jpg")
        );
        assert_eq!(source.resolve("/photos/a.png"), PathBuf::from("/photos/a.png"));
    }

    #[test]
    fn relative_paths_use_root() {
        let source = LocalAssetSource::with_root("/srv/picks");
        assert_eq!(source.resolve("a.png"), PathBuf::from("/srv/picks/a.png"));
        assert_eq!(source.resolve("/abs/a.png"), PathBuf::from("/abs/a.png"));
    }

    #[tokio::test]
    async fn reads_file_as_base64() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("porch.png");
        let bytes: Vec<u8> = (0..=255).collect();
        std::fs::write(&path, &bytes).unwrap();

        let source = LocalAssetSource::new();
        let uri = path.to_string_lossy().into_owned();
        assert!(source.exists(&uri).await);

        let text = source.read_base64(&uri).await.unwrap();
        assert_eq!(decode_base64(&text).unwrap(), bytes);
    }

    #[tokio::test]
    async fn directories_and_missing_files_do_not_exist() {
        let dir = tempdir().unwrap();
        let source = LocalAssetSource::new();
        assert!(!source.exists(&dir.path().to_string_lossy()).await);
        assert!(
            !source
                .exists(&dir.path().join("gone.jpg").to_string_lossy())
                .await
        );
        assert!(source
            .read_base64(&dir.path().join("gone.jpg").to_string_lossy())
            .await
            .is_err());
    }
}
