//! Core traits defined in `mediahub-core` and implemented by other crates.

pub mod asset_host;

pub use asset_host::{AssetHost, AssetUpload, UploadedAsset};
