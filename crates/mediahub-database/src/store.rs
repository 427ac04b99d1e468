//! Store traits and the bundle the rest of the workspace is wired with.
//!
//! The core treats the store as transactional: every method is a single
//! atomic operation. Identity inputs are normalized by the store before
//! comparison, so callers may pass raw user input.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use mediahub_core::config::{AppConfig, StoreBackend};
use mediahub_core::result::AppResult;
use mediahub_core::types::{AccountId, MediaId};
use mediahub_entity::{Account, AccountPatch, MediaItem, NewAccount, PasswordHash, Subscription};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::repositories::{PgAccountStore, PgRelationStore};

/// Account persistence, including the session record.
#[async_trait]
pub trait AccountStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find an account by primary key.
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>>;

    /// Find an account by username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    /// Find an account by username or email.
    ///
    /// A username match wins over an email match; among equal matches the
    /// oldest account wins. Both keys absent yields `None`.
    async fn find_by_identity(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<Option<Account>>;

    /// Whether another account (other than `except`) already uses either key.
    async fn identity_taken(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<AccountId>,
    ) -> AppResult<bool>;

    /// Insert a new account. Duplicate username or email is a conflict.
    async fn create(&self, account: NewAccount) -> AppResult<Account>;

    /// Apply a profile patch. Returns `None` if the account does not exist.
    async fn update_fields(&self, id: AccountId, patch: &AccountPatch)
    -> AppResult<Option<Account>>;

    /// Replace the stored credential. Returns `false` if the account does not exist.
    async fn update_password(&self, id: AccountId, hash: &PasswordHash) -> AppResult<bool>;

    /// Unconditionally overwrite (or clear) the stored refresh token.
    ///
    /// Returns `false` if the account does not exist.
    async fn set_refresh_token(&self, id: AccountId, token: Option<&str>) -> AppResult<bool>;

    /// Replace the stored refresh token only if it currently equals `expected`.
    ///
    /// Read, compare, and write happen as one atomic step: of several
    /// concurrent calls presenting the same `expected`, at most one returns
    /// `true`.
    async fn compare_and_swap_refresh_token(
        &self,
        id: AccountId,
        expected: &str,
        new: Option<&str>,
    ) -> AppResult<bool>;

    /// Append a media id to the account's watch history.
    async fn record_watch(&self, id: AccountId, media_id: MediaId) -> AppResult<bool>;
}

/// Subscription edges, media records, and bulk account lookups.
#[async_trait]
pub trait RelationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Create the edge `subscriber → channel`. Returns `false` if it already exists.
    async fn subscribe(&self, subscriber: AccountId, channel: AccountId) -> AppResult<bool>;

    /// Remove the edge `subscriber → channel`. Returns `false` if it did not exist.
    async fn unsubscribe(&self, subscriber: AccountId, channel: AccountId) -> AppResult<bool>;

    /// All edges whose channel is `channel`.
    async fn subscriptions_to(&self, channel: AccountId) -> AppResult<Vec<Subscription>>;

    /// All edges whose subscriber is `subscriber`.
    async fn subscriptions_by(&self, subscriber: AccountId) -> AppResult<Vec<Subscription>>;

    /// Insert a media record.
    async fn create_media(&self, media: &MediaItem) -> AppResult<MediaItem>;

    /// Media records for the given ids, in no particular order. Unknown ids are skipped.
    async fn find_media(&self, ids: &[MediaId]) -> AppResult<Vec<MediaItem>>;

    /// Accounts for the given ids, in no particular order. Unknown ids are skipped.
    async fn find_accounts(&self, ids: &[AccountId]) -> AppResult<Vec<Account>>;
}

/// The store handles every service is constructed with.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Accounts and session records.
    pub accounts: Arc<dyn AccountStore>,
    /// Edges and media.
    pub relations: Arc<dyn RelationStore>,
}

impl Stores {
    /// Both traits backed by one in-memory store.
    pub fn memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    /// Both traits backed by the given in-memory store.
    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            accounts: Arc::new(store.clone()),
            relations: Arc::new(store),
        }
    }

    /// Both traits backed by PostgreSQL.
    pub fn postgres(pool: &DatabasePool) -> Self {
        Self {
            accounts: Arc::new(PgAccountStore::new(pool.pool().clone())),
            relations: Arc::new(PgRelationStore::new(pool.pool().clone())),
        }
    }

    /// Builds the configured backend, connecting and migrating if it is PostgreSQL.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        match config.store.backend {
            StoreBackend::Memory => {
                info!("Using in-memory store; data will not persist");
                Ok(Self::memory())
            }
            StoreBackend::Postgres => {
                let pool =
                    DatabasePool::connect(&config.database, config.store.operation_timeout())
                        .await?;
                crate::migration::run_migrations(pool.pool()).await?;
                Ok(Self::postgres(&pool))
            }
        }
    }
}
