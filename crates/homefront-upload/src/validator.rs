use homefront_core::constants::DEFAULT_ALLOWED_EXTENSIONS;
use homefront_core::ImageAsset;

use crate::error::IneligibleAsset;
use crate::source::AssetSource;

/// An asset that passed every eligibility check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAsset {
    pub index: usize,
    pub uri: String,
    pub file_name: String,
    /// Lowercased extension of `file_name`.
    pub extension: String,
}

impl ValidatedAsset {
    /// Content type sent with the upload: `image/<extension>`.
    pub fn content_type(&self) -> String {
        format!("image/{}", self.extension)
    }
}

/// Asset eligibility checks
///
/// Checks run cheapest first: presence of a handle, then the declared name's
/// extension against the allow-list, then existence through the asset source.
/// A rejection has no side effects.
#[derive(Debug, Clone)]
pub struct AssetValidator {
    allowed_extensions: Vec<String>,
}

impl Default for AssetValidator {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        )
    }
}

impl AssetValidator {
    pub fn new(allowed_extensions: Vec<String>) -> Self {
        Self {
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Validate the resource handle
    pub fn validate_handle(&self, asset: &ImageAsset) -> Result<(), IneligibleAsset> {
        if asset.uri.trim().is_empty() {
            return Err(IneligibleAsset::MissingHandle);
        }
        Ok(())
    }

    /// Validate the declared name's extension, returning it lowercased
    ///
    /// The extension is the text after the last `.` of the declared name, so
    /// `.png` has extension `png` and `a.b.JPG` has `jpg`.
    pub fn validate_extension(&self, asset: &ImageAsset) -> Result<String, IneligibleAsset> {
        let file_name = asset
            .file_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or(IneligibleAsset::MissingName)?;

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .map(|ext| ext.to_lowercase())
            .ok_or_else(|| IneligibleAsset::MissingExtension {
                file_name: file_name.to_string(),
            })?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(IneligibleAsset::UnsupportedExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }

    /// Run every check for one asset
    pub async fn validate(
        &self,
        index: usize,
        asset: &ImageAsset,
        source: &dyn AssetSource,
    ) -> Result<ValidatedAsset, IneligibleAsset> {
        self.validate_handle(asset)?;
        let extension = self.validate_extension(asset)?;

        if !source.exists(&asset.uri).await {
            return Err(IneligibleAsset::NotFound {
                uri: asset.uri.clone(),
            });
        }

        Ok(ValidatedAsset {
            index,
            uri: asset.uri.clone(),
            file_name: asset.display_name().to_string(),
            extension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        exists: bool,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new(exists: bool) -> Self {
            Self {
                exists,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AssetSource for CountingSource {
        async fn exists(&self, _uri: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.exists
        }

        async fn read_base64(&self, _uri: &str) -> std::io::Result<String> {
            unreachable!("validator never reads content")
        }
    }

    #[test]
    fn test_validate_extension_ok() {
        let validator = AssetValidator::default();
        for name in ["a.png", "b.jpg", "c.jpeg", "D.PNG", "Front Yard.JpEg"] {
            assert!(
                validator
                    .validate_extension(&ImageAsset::new("file:///x", name))
                    .is_ok(),
                "{name} should pass"
            );
        }
    }

    #[test]
    fn test_validate_extension_lowercases() {
        let validator = AssetValidator::default();
        let ext = validator
            .validate_extension(&ImageAsset::new("file:///x", "Pool.JPG"))
            .unwrap();
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn test_validate_extension_after_last_dot() {
        let validator = AssetValidator::default();
        let ext = |name: &str| validator.validate_extension(&ImageAsset::new("/x", name));
        assert_eq!(ext(".png"), Ok("png".to_string()));
        assert_eq!(ext("a.b.JPG"), Ok("jpg".to_string()));
        assert_eq!(ext("listing/Den.jpeg"), Ok("jpeg".to_string()));
        assert!(matches!(
            ext("v1.2/photo"),
            Err(IneligibleAsset::UnsupportedExtension { .. })
        ));
    }

    #[test]
    fn test_validate_extension_invalid() {
        let validator = AssetValidator::default();
        assert!(matches!(
            validator.validate_extension(&ImageAsset::new("file:///x", "yard.gif")),
            Err(IneligibleAsset::UnsupportedExtension { .. })
        ));
        assert!(matches!(
            validator.validate_extension(&ImageAsset::new("file:///x", "yard.png.exe")),
            Err(IneligibleAsset::UnsupportedExtension { .. })
        ));
    }

    #[test]
    fn test_validate_extension_missing() {
        let validator = AssetValidator::default();
        assert!(matches!(
            validator.validate_extension(&ImageAsset::new("file:///x", "noextension")),
            Err(IneligibleAsset::MissingExtension { .. })
        ));
        assert!(matches!(
            validator.validate_extension(&ImageAsset::new("file:///x", "trailing.")),
            Err(IneligibleAsset::MissingExtension { .. })
        ));
        let unnamed = ImageAsset {
            uri: "file:///x".to_string(),
            ..Default::default()
        };
        assert_eq!(
            validator.validate_extension(&unnamed),
            Err(IneligibleAsset::MissingName)
        );
    }

    #[test]
    fn test_validate_handle() {
        let validator = AssetValidator::default();
        assert_eq!(
            validator.validate_handle(&ImageAsset::new("  ", "a.png")),
            Err(IneligibleAsset::MissingHandle)
        );
        assert!(validator
            .validate_handle(&ImageAsset::new("/tmp/a.png", "a.png"))
            .is_ok());
    }

    #[tokio::test]
    async fn test_validate_all_ok() {
        let validator = AssetValidator::default();
        let source = CountingSource::new(true);
        let validated = validator
            .validate(3, &ImageAsset::new("/tmp/Front Yard.jpg", "Front Yard.jpg"), &source)
            .await
            .unwrap();
        assert_eq!(validated.index, 3);
        assert_eq!(validated.extension, "jpg");
        assert_eq!(validated.content_type(), "image/jpg");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_validate_not_found() {
        let validator = AssetValidator::default();
        let source = CountingSource::new(false);
        let result = validator
            .validate(0, &ImageAsset::new("/tmp/stale.png", "stale.png"), &source)
            .await;
        assert_eq!(
            result,
            Err(IneligibleAsset::NotFound {
                uri: "/tmp/stale.png".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_existence_not_checked_after_cheap_rejection() {
        let validator = AssetValidator::default();
        let source = CountingSource::new(true);
        let _ = validator
            .validate(0, &ImageAsset::new("/tmp/a.gif", "a.gif"), &source)
            .await;
        let _ = validator
            .validate(1, &ImageAsset::new("", "a.png"), &source)
            .await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_custom_allow_list() {
        let validator = AssetValidator::new(vec!["WEBP".to_string()]);
        assert!(validator
            .validate_extension(&ImageAsset::new("/x", "a.webp"))
            .is_ok());
        assert!(validator
            .validate_extension(&ImageAsset::new("/x", "a.png"))
            .is_err());
    }
}
