//! Asset host implementations.

pub mod http;
pub mod local;

pub use http::HttpAssetHost;
pub use local::LocalAssetHost;

use uuid::Uuid;

/// A collision-free stored name that keeps the upload's extension.
pub(crate) fn stored_name(file_name: &str) -> String {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
        None => Uuid::new_v4().to_string(),
    }
}
