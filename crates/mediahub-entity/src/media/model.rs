//! Media item entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use mediahub_core::types::{AccountId, MediaId};

/// A published video owned by an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MediaItem {
    /// Media identifier.
    pub id: MediaId,
    /// Owning account.
    pub owner_id: AccountId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Location of the video file on the asset host.
    pub video_url: String,
    /// Location of the thumbnail on the asset host.
    pub thumbnail_url: String,
    /// Length in seconds.
    pub duration_seconds: f64,
    /// View counter.
    pub views: i64,
    /// Whether the owner has published it.
    pub is_published: bool,
    /// Upload time.
    pub created_at: DateTime<Utc>,
}
