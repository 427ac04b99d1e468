//! Loads relations from the store and computes the read models.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use mediahub_core::deadline::bounded;
use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::types::{AccountId, MediaId};
use mediahub_database::{AccountStore, RelationStore, Stores};
use mediahub_entity::account::normalize_username;
use mediahub_entity::{ChannelProfile, WatchHistoryEntry};

/// Channel profile and watch history queries.
#[derive(Debug, Clone)]
pub struct AggregatorService {
    /// Account lookups.
    accounts: Arc<dyn AccountStore>,
    /// Edges and media.
    relations: Arc<dyn RelationStore>,
    /// Deadline for each store call.
    store_timeout: Duration,
}

impl AggregatorService {
    /// Creates a new aggregator service.
    pub fn new(stores: &Stores, store_timeout: Duration) -> Self {
        Self {
            accounts: Arc::clone(&stores.accounts),
            relations: Arc::clone(&stores.relations),
            store_timeout,
        }
    }

    /// The channel page for `username` as seen by `viewer`.
    pub async fn channel_profile(
        &self,
        username: &str,
        viewer: Option<AccountId>,
    ) -> AppResult<ChannelProfile> {
        let username = normalize_username(username);
        if username.is_empty() {
            return Err(AppError::validation("Username is missing"));
        }

        let channel = bounded(
            "find channel",
            self.store_timeout,
            self.accounts.find_by_username(&username),
        )
        .await?
        .ok_or_else(|| AppError::not_found("Channel does not exist"))?;

        let (edges_to, edges_by) = tokio::try_join!(
            bounded(
                "load subscribers",
                self.store_timeout,
                self.relations.subscriptions_to(channel.id),
            ),
            bounded(
                "load subscriptions",
                self.store_timeout,
                self.relations.subscriptions_by(channel.id),
            ),
        )?;

        debug!(
            channel_id = %channel.id,
            subscribers = edges_to.len(),
            subscribed_to = edges_by.len(),
            "Computed channel profile"
        );
        super::channel_profile(&channel, &edges_to, &edges_by, viewer)
    }

    /// The account's watched media, in watch order, with owners resolved.
    pub async fn watch_history(&self, account_id: AccountId) -> AppResult<Vec<WatchHistoryEntry>> {
        let account = bounded(
            "find account",
            self.store_timeout,
            self.accounts.find_by_id(account_id),
        )
        .await?
        .ok_or_else(|| AppError::not_found("Account not found"))?;

        if account.watch_history.is_empty() {
            return Ok(Vec::new());
        }

        let media_ids: Vec<MediaId> = distinct(&account.watch_history);
        let media = bounded(
            "load watched media",
            self.store_timeout,
            self.relations.find_media(&media_ids),
        )
        .await?;

        let owner_ids: Vec<AccountId> =
            distinct(&media.iter().map(|item| item.owner_id).collect::<Vec<_>>());
        let owners = bounded(
            "load media owners",
            self.store_timeout,
            self.relations.find_accounts(&owner_ids),
        )
        .await?;

        Ok(super::watch_history(&account.watch_history, &media, &owners))
    }
}

/// Unique ids in first-seen order.
fn distinct<T: Copy + Eq + std::hash::Hash>(ids: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
