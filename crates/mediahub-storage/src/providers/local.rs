//! Local filesystem asset host.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use mediahub_core::config::AssetConfig;
use mediahub_core::error::{AppError, ErrorKind};
use mediahub_core::result::AppResult;
use mediahub_core::traits::{AssetHost, AssetUpload, UploadedAsset};

use super::stored_name;

/// Writes assets under a local directory and hands out URLs below a
/// configured public prefix. Something else serves the directory.
#[derive(Debug, Clone)]
pub struct LocalAssetHost {
    /// Directory assets are written to (`<local_root>/<folder>`).
    root: PathBuf,
    /// URL prefix matching `root`.
    public_base_url: String,
}

impl LocalAssetHost {
    /// Create a local asset host, creating the target directory if needed.
    pub async fn new(config: &AssetConfig) -> AppResult<Self> {
        let root = PathBuf::from(&config.local_root).join(config.folder.trim_matches('/'));
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Upstream,
                format!("Failed to create asset directory: {}", root.display()),
                e,
            )
        })?;

        let base = config.public_base_url.trim_end_matches('/');
        let folder = config.folder.trim_matches('/');
        let public_base_url = if folder.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{folder}")
        };

        Ok(Self {
            root,
            public_base_url,
        })
    }
}

#[async_trait]
impl AssetHost for LocalAssetHost {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn upload(&self, asset: AssetUpload) -> AppResult<UploadedAsset> {
        if asset.is_empty() {
            return Err(AppError::validation("Asset file is empty"));
        }

        let name = stored_name(&asset.file_name);
        let path = self.root.join(&name);
        fs::write(&path, &asset.bytes).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Upstream,
                format!("Failed to write asset: {name}"),
                e,
            )
        })?;

        debug!(file = %name, bytes = asset.bytes.len(), "Stored asset locally");
        Ok(UploadedAsset {
            url: format!("{}/{name}", self.public_base_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(root: &std::path::Path) -> AssetConfig {
        AssetConfig {
            local_root: root.to_string_lossy().into_owned(),
            public_base_url: "https://assets.example.com/".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upload_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let host = LocalAssetHost::new(&config(dir.path())).await.unwrap();

        let uploaded = host
            .upload(AssetUpload::new("avatar.png", &b"png-bytes"[..]))
            .await
            .unwrap();

        assert!(uploaded.url.starts_with("https://assets.example.com/avatars/"));
        assert!(uploaded.url.ends_with(".png"));

        let name = uploaded.url.rsplit('/').next().unwrap();
        let written = std::fs::read(dir.path().join("avatars").join(name)).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn test_empty_upload_is_validation() {
        let dir = tempfile::tempdir().unwrap();
        let host = LocalAssetHost::new(&config(dir.path())).await.unwrap();
        let err = host
            .upload(AssetUpload::new("avatar.png", Vec::<u8>::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
