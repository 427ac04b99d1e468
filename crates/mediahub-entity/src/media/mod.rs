//! Media entities.

pub mod model;

pub use model::MediaItem;
