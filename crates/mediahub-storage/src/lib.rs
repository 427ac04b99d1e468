//! # mediahub-storage
//!
//! Asset host implementations for MediaHub: a remote image host reached
//! over HTTP multipart, and a local directory for development.

pub mod manager;
pub mod providers;

pub use manager::asset_host_from_config;
pub use providers::{HttpAssetHost, LocalAssetHost};
