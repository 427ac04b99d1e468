//! Remote image host reached over HTTP multipart upload.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use reqwest::multipart::{Form, Part};
use tracing::{debug, error};

use mediahub_core::config::AssetConfig;
use mediahub_core::error::{AppError, ErrorKind};
use mediahub_core::result::AppResult;
use mediahub_core::traits::{AssetHost, AssetUpload, UploadedAsset};

use super::stored_name;

/// Posts assets as `multipart/form-data` to an upload endpoint and reads
/// the public URL back from its JSON reply.
#[derive(Debug, Clone)]
pub struct HttpAssetHost {
    client: Client,
    upload_url: String,
    api_key: String,
    folder: String,
}

impl HttpAssetHost {
    /// Create an HTTP asset host from configuration.
    pub fn new(config: &AssetConfig) -> AppResult<Self> {
        if config.upload_url.trim().is_empty() {
            return Err(AppError::configuration(
                "assets.upload_url is required for the http provider",
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
            folder: config.folder.clone(),
        })
    }
}

/// Pulls the asset URL out of an upload reply, preferring `secure_url`.
pub(crate) fn parse_upload_response(body: &serde_json::Value) -> AppResult<UploadedAsset> {
    ["secure_url", "url"]
        .iter()
        .filter_map(|key| body.get(key).and_then(|v| v.as_str()))
        .find(|url| !url.is_empty())
        .map(|url| UploadedAsset {
            url: url.to_string(),
        })
        .ok_or_else(|| AppError::upstream("Asset host reply did not contain a URL"))
}

/// A 4xx means the host refused this asset; anything else is the host failing.
fn rejection_error(status: StatusCode) -> AppError {
    let message = format!("Asset host rejected upload with status {status}");
    if status.is_client_error() {
        AppError::validation(message)
    } else {
        AppError::upstream(message)
    }
}

#[async_trait]
impl AssetHost for HttpAssetHost {
    fn provider_type(&self) -> &str {
        "http"
    }

    async fn upload(&self, asset: AssetUpload) -> AppResult<UploadedAsset> {
        if asset.is_empty() {
            return Err(AppError::validation("Asset file is empty"));
        }

        let name = stored_name(&asset.file_name);
        let size = asset.bytes.len();
        let mut part = Part::bytes(asset.bytes.to_vec()).file_name(name.clone());
        if let Some(content_type) = &asset.content_type {
            part = part.mime_str(content_type).map_err(|e| {
                AppError::with_source(ErrorKind::Validation, "Invalid asset content type", e)
            })?;
        }

        let form = Form::new()
            .text("folder", self.folder.clone())
            .text("resource_type", "image")
            .part("file", part);

        let mut request = self.client.post(&self.upload_url).multipart(form);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Asset upload request failed");
            AppError::with_source(ErrorKind::Upstream, "Asset host is unreachable", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Asset host rejected upload");
            return Err(rejection_error(status));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::Upstream, "Asset host reply was not JSON", e)
        })?;
        let uploaded = parse_upload_response(&body)?;

        debug!(file = %name, bytes = size, url = %uploaded.url, "Uploaded asset");
        Ok(uploaded)
    }
}
