//! Asset host configuration.

use serde::{Deserialize, Serialize};

/// Which asset host receives avatar and cover uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetProvider {
    /// Remote image host reached over HTTP.
    Http,
    /// Local directory, served by something else.
    #[default]
    Local,
}

/// Asset host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Provider to use.
    #[serde(default)]
    pub provider: AssetProvider,
    /// Upload endpoint for the HTTP provider.
    #[serde(default)]
    pub upload_url: String,
    /// API key sent with HTTP uploads.
    #[serde(default)]
    pub api_key: String,
    /// Remote folder assets are grouped under.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Root directory for the local provider.
    #[serde(default = "default_local_root")]
    pub local_root: String,
    /// Public URL prefix for files written by the local provider.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            provider: AssetProvider::default(),
            upload_url: String::new(),
            api_key: String::new(),
            folder: default_folder(),
            local_root: default_local_root(),
            public_base_url: default_public_base_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_folder() -> String {
    "avatars".to_string()
}

fn default_local_root() -> String {
    "./data/assets".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080/assets".to_string()
}

fn default_request_timeout() -> u64 {
    30
}
