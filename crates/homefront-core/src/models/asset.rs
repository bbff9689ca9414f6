use serde::{Deserialize, Serialize};

/// A locally picked image waiting to be uploaded.
///
/// `uri` is the platform resource handle (a path or a `file://` URI).
/// `file_name` is the name the picker declared for the asset; the upload key
/// and content type are derived from it, not from `uri`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    #[serde(default)]
    pub uri: String,
    #[serde(default, alias = "fileName")]
    pub file_name: Option<String>,
    #[serde(default, alias = "mimeType")]
    pub mime_type: Option<String>,
}

impl ImageAsset {
    pub fn new(uri: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            file_name: Some(file_name.into()),
            mime_type: None,
        }
    }

    /// Build an asset from a local path, declaring the path's final component as its name.
    pub fn from_path(path: &std::path::Path) -> Self {
        Self {
            uri: path.to_string_lossy().into_owned(),
            file_name: path
                .file_name()
                .and_then(|n| n.to_str())
                .map(String::from),
            mime_type: None,
        }
    }

    /// Declared name, or `""` when the picker supplied none.
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("")
    }
}
