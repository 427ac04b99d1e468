//! Read-only projections computed by the relationship aggregator.
//!
//! Each projection exposes a fixed allow-list of fields.

use serde::{Deserialize, Serialize};

use mediahub_core::types::AccountId;

use crate::account::Account;
use crate::media::MediaItem;

/// Public channel page for an account, as seen by a viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelProfile {
    /// Channel account id.
    pub id: AccountId,
    /// Display name.
    pub full_name: String,
    /// Handle.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Primary image URL.
    pub avatar: Option<String>,
    /// Banner image URL.
    pub cover_image: Option<String>,
    /// Number of accounts subscribed to this channel.
    pub subscribers_count: u64,
    /// Number of channels this account subscribes to.
    pub channel_subscribed_to_count: u64,
    /// Whether the viewer subscribes to this channel.
    pub is_subscribed: bool,
}

/// Reduced owner projection attached to each watch-history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSummary {
    /// Display name.
    pub full_name: String,
    /// Handle.
    pub username: String,
    /// Primary image URL.
    pub avatar: Option<String>,
}

impl From<&Account> for OwnerSummary {
    fn from(account: &Account) -> Self {
        Self {
            full_name: account.full_name.clone(),
            username: account.username.clone(),
            avatar: account.avatar.clone(),
        }
    }
}

/// A watched media item with its owner resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchHistoryEntry {
    /// The media record.
    #[serde(flatten)]
    pub media: MediaItem,
    /// The owner, or `None` if the owning account no longer exists.
    pub owner: Option<OwnerSummary>,
}
