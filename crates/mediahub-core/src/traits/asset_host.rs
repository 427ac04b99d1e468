//! Asset host trait for avatar and cover image uploads.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// A file handed to the asset host.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    /// Original file name, used to derive the stored name.
    pub file_name: String,
    /// MIME type, if the caller knows it.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Bytes,
}

impl AssetUpload {
    /// Creates an upload from a name and its bytes.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// Sets the MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Whether there is nothing to upload.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Where an uploaded asset can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UploadedAsset {
    /// Public URL of the stored asset.
    pub url: String,
}

/// External image host.
///
/// The core only consumes the returned URL. Implementations report every
/// failure as [`crate::ErrorKind::Upstream`] so callers can tell it apart
/// from input validation.
#[async_trait]
pub trait AssetHost: Send + Sync + std::fmt::Debug + 'static {
    /// Provider name for logs (e.g. `"http"`, `"local"`).
    fn provider_type(&self) -> &str;

    /// Stores the asset and returns its public location.
    async fn upload(&self, asset: AssetUpload) -> AppResult<UploadedAsset>;
}
