//! Subscription edges between accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use mediahub_core::types::{AccountId, SubscriptionId};

/// Directed edge: `subscriber` follows `channel`.
///
/// At most one edge exists per `(subscriber, channel)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    /// Edge identifier.
    pub id: SubscriptionId,
    /// The following account.
    pub subscriber_id: AccountId,
    /// The followed account.
    pub channel_id: AccountId,
    /// When the edge was created.
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Creates a new edge stamped with the current time.
    pub fn new(subscriber_id: AccountId, channel_id: AccountId) -> Self {
        Self {
            id: SubscriptionId::new(),
            subscriber_id,
            channel_id,
            created_at: Utc::now(),
        }
    }
}
