//! Builds the configured asset host.

use std::sync::Arc;

use tracing::info;

use mediahub_core::config::{AssetConfig, AssetProvider};
use mediahub_core::result::AppResult;
use mediahub_core::traits::AssetHost;

use crate::providers::{HttpAssetHost, LocalAssetHost};

/// Instantiates the provider selected by `assets.provider`.
pub async fn asset_host_from_config(config: &AssetConfig) -> AppResult<Arc<dyn AssetHost>> {
    let host: Arc<dyn AssetHost> = match config.provider {
        AssetProvider::Http => Arc::new(HttpAssetHost::new(config)?),
        AssetProvider::Local => Arc::new(LocalAssetHost::new(config).await?),
    };
    info!(provider = host.provider_type(), "Asset host ready");
    Ok(host)
}
