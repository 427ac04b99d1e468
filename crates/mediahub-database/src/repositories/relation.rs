//! Subscription and media repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::types::{AccountId, MediaId, SubscriptionId};
use mediahub_entity::{Account, MediaItem, Subscription};

use super::account::ACCOUNT_SELECT;
use super::{db_error, is_foreign_key_violation};
use crate::store::RelationStore;

/// PostgreSQL-backed [`RelationStore`].
#[derive(Debug, Clone)]
pub struct PgRelationStore {
    pool: PgPool,
}

impl PgRelationStore {
    /// Create a new relation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationStore for PgRelationStore {
    async fn subscribe(&self, subscriber: AccountId, channel: AccountId) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO subscriptions (id, subscriber_id, channel_id) VALUES ($1, $2, $3) \
             ON CONFLICT (subscriber_id, channel_id) DO NOTHING",
        )
        .bind(SubscriptionId::new())
        .bind(subscriber)
        .bind(channel)
        .execute(&self.pool)
        .await
        .map_err(subscription_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn unsubscribe(&self, subscriber: AccountId, channel: AccountId) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2")
                .bind(subscriber)
                .bind(channel)
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to delete subscription"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn subscriptions_to(&self, channel: AccountId) -> AppResult<Vec<Subscription>> {
        sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE channel_id = $1 ORDER BY created_at",
        )
        .bind(channel)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list subscribers"))
    }

    async fn subscriptions_by(&self, subscriber: AccountId) -> AppResult<Vec<Subscription>> {
        sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE subscriber_id = $1 ORDER BY created_at",
        )
        .bind(subscriber)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list subscriptions"))
    }

    async fn create_media(&self, media: &MediaItem) -> AppResult<MediaItem> {
        sqlx::query_as::<_, MediaItem>(
            "INSERT INTO media (id, owner_id, title, description, video_url, thumbnail_url, \
             duration_seconds, views, is_published, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(media.id)
        .bind(media.owner_id)
        .bind(&media.title)
        .bind(&media.description)
        .bind(&media.video_url)
        .bind(&media.thumbnail_url)
        .bind(media.duration_seconds)
        .bind(media.views)
        .bind(media.is_published)
        .bind(media.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create media"))
    }

    async fn find_media(&self, ids: &[MediaId]) -> AppResult<Vec<MediaItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, MediaItem>("SELECT * FROM media WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to load media"))
    }

    async fn find_accounts(&self, ids: &[AccountId]) -> AppResult<Vec<Account>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Account>(&format!("{ACCOUNT_SELECT} WHERE a.id = ANY($1)"))
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to load accounts"))
    }
}

/// A missing endpoint trips the foreign keys; report it like the in-memory store.
fn subscription_error(err: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        AppError::not_found("Subscriber or channel does not exist")
    } else {
        db_error("Failed to create subscription")(err)
    }
}
