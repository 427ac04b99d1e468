//! In-memory store backed by `dashmap`.
//!
//! Used by the test suites and by `store.backend = "memory"`. Uniqueness is
//! enforced through secondary index maps claimed with the entry API, and
//! refresh token swaps run under the account's shard write lock, so the
//! same atomicity guarantees hold as with PostgreSQL.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::types::{AccountId, MediaId};
use mediahub_entity::account::{normalize_email, normalize_username};
use mediahub_entity::{Account, AccountPatch, MediaItem, NewAccount, PasswordHash, Subscription};

use crate::store::{AccountStore, RelationStore};

#[derive(Debug, Default)]
struct Inner {
    accounts: DashMap<AccountId, Account>,
    usernames: DashMap<String, AccountId>,
    emails: DashMap<String, AccountId>,
    subscriptions: DashMap<(AccountId, AccountId), Subscription>,
    media: DashMap<MediaId, MediaItem>,
}

/// Process-local store implementing both [`AccountStore`] and [`RelationStore`].
///
/// Cloning is cheap and every clone shares the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub fn account_count(&self) -> usize {
        self.inner.accounts.len()
    }

    /// Removes an account and its index entries, keeping any media it owns.
    pub fn remove_account(&self, id: AccountId) -> bool {
        match self.inner.accounts.remove(&id) {
            Some((_, account)) => {
                self.inner.usernames.remove_if(&account.username, |_, v| *v == id);
                self.inner.emails.remove_if(&account.email, |_, v| *v == id);
                self.inner
                    .subscriptions
                    .retain(|(subscriber, channel), _| *subscriber != id && *channel != id);
                true
            }
            None => false,
        }
    }

    fn lookup(&self, index: &DashMap<String, AccountId>, key: &str) -> Option<Account> {
        let id = index.get(key).map(|entry| *entry.value())?;
        self.inner.accounts.get(&id).map(|entry| entry.value().clone())
    }

    fn claims_other(index: &DashMap<String, AccountId>, key: &str, except: Option<AccountId>) -> bool {
        index
            .get(key)
            .is_some_and(|owner| Some(*owner.value()) != except)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>> {
        Ok(self.inner.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        Ok(self.lookup(&self.inner.usernames, &normalize_username(username)))
    }

    async fn find_by_identity(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<Option<Account>> {
        if let Some(username) = username {
            if let Some(account) = self.lookup(&self.inner.usernames, &normalize_username(username)) {
                return Ok(Some(account));
            }
        }
        Ok(email.and_then(|email| self.lookup(&self.inner.emails, &normalize_email(email))))
    }

    async fn identity_taken(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<AccountId>,
    ) -> AppResult<bool> {
        let username_taken = username.is_some_and(|u| {
            Self::claims_other(&self.inner.usernames, &normalize_username(u), except)
        });
        let email_taken = email
            .is_some_and(|e| Self::claims_other(&self.inner.emails, &normalize_email(e), except));
        Ok(username_taken || email_taken)
    }

    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        let id = AccountId::new();
        let username = normalize_username(&account.username);
        let email = normalize_email(&account.email);

        match self.inner.usernames.entry(username.clone()) {
            Entry::Occupied(_) => return Err(AppError::conflict("Username is already taken")),
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }
        match self.inner.emails.entry(email.clone()) {
            Entry::Occupied(_) => {
                self.inner.usernames.remove(&username);
                return Err(AppError::conflict("Email is already registered"));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let now = Utc::now();
        let stored = Account {
            id,
            username,
            email,
            full_name: account.full_name,
            avatar: account.avatar,
            cover_image: account.cover_image,
            password_hash: account.password_hash,
            refresh_token: None,
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.inner.accounts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_fields(
        &self,
        id: AccountId,
        patch: &AccountPatch,
    ) -> AppResult<Option<Account>> {
        let Some(current_email) = self
            .inner
            .accounts
            .get(&id)
            .map(|entry| entry.value().email.clone())
        else {
            return Ok(None);
        };

        let mut patch = patch.clone();
        patch.email = patch.email.as_deref().map(normalize_email);

        let moved_email = patch.email.clone().filter(|email| *email != current_email);
        if let Some(new_email) = &moved_email {
            match self.inner.emails.entry(new_email.clone()) {
                Entry::Occupied(_) => {
                    return Err(AppError::conflict("Email is already registered"));
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        let updated = self.inner.accounts.get_mut(&id).map(|mut entry| {
            patch.apply_to(entry.value_mut());
            entry.value().clone()
        });

        match (&updated, moved_email) {
            (Some(_), Some(_)) => {
                self.inner.emails.remove_if(&current_email, |_, v| *v == id);
            }
            (None, Some(new_email)) => {
                self.inner.emails.remove(&new_email);
            }
            _ => {}
        }
        Ok(updated)
    }

    async fn update_password(&self, id: AccountId, hash: &PasswordHash) -> AppResult<bool> {
        Ok(match self.inner.accounts.get_mut(&id) {
            Some(mut entry) => {
                let account = entry.value_mut();
                account.password_hash = hash.clone();
                account.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn set_refresh_token(&self, id: AccountId, token: Option<&str>) -> AppResult<bool> {
        Ok(match self.inner.accounts.get_mut(&id) {
            Some(mut entry) => {
                let account = entry.value_mut();
                account.refresh_token = token.map(str::to_string);
                account.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn compare_and_swap_refresh_token(
        &self,
        id: AccountId,
        expected: &str,
        new: Option<&str>,
    ) -> AppResult<bool> {
        let Some(mut entry) = self.inner.accounts.get_mut(&id) else {
            return Ok(false);
        };
        let account = entry.value_mut();
        if !account.holds_refresh_token(expected) {
            return Ok(false);
        }
        account.refresh_token = new.map(str::to_string);
        account.updated_at = Utc::now();
        Ok(true)
    }

    async fn record_watch(&self, id: AccountId, media_id: MediaId) -> AppResult<bool> {
        Ok(match self.inner.accounts.get_mut(&id) {
            Some(mut entry) => {
                entry.value_mut().watch_history.push(media_id);
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl RelationStore for MemoryStore {
    async fn subscribe(&self, subscriber: AccountId, channel: AccountId) -> AppResult<bool> {
        if !self.inner.accounts.contains_key(&subscriber) || !self.inner.accounts.contains_key(&channel)
        {
            return Err(AppError::not_found("Subscriber or channel does not exist"));
        }
        Ok(match self.inner.subscriptions.entry((subscriber, channel)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Subscription::new(subscriber, channel));
                true
            }
        })
    }

    async fn unsubscribe(&self, subscriber: AccountId, channel: AccountId) -> AppResult<bool> {
        Ok(self.inner.subscriptions.remove(&(subscriber, channel)).is_some())
    }

    async fn subscriptions_to(&self, channel: AccountId) -> AppResult<Vec<Subscription>> {
        let mut edges: Vec<Subscription> = self
            .inner
            .subscriptions
            .iter()
            .filter(|entry| entry.value().channel_id == channel)
            .map(|entry| entry.value().clone())
            .collect();
        edges.sort_by_key(|edge| edge.created_at);
        Ok(edges)
    }

    async fn subscriptions_by(&self, subscriber: AccountId) -> AppResult<Vec<Subscription>> {
        let mut edges: Vec<Subscription> = self
            .inner
            .subscriptions
            .iter()
            .filter(|entry| entry.value().subscriber_id == subscriber)
            .map(|entry| entry.value().clone())
            .collect();
        edges.sort_by_key(|edge| edge.created_at);
        Ok(edges)
    }

    async fn create_media(&self, media: &MediaItem) -> AppResult<MediaItem> {
        match self.inner.media.entry(media.id) {
            Entry::Occupied(_) => Err(AppError::conflict("Media already exists")),
            Entry::Vacant(slot) => {
                slot.insert(media.clone());
                Ok(media.clone())
            }
        }
    }

    async fn find_media(&self, ids: &[MediaId]) -> AppResult<Vec<MediaItem>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.inner.media.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn find_accounts(&self, ids: &[AccountId]) -> AppResult<Vec<Account>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.inner.accounts.get(id).map(|entry| entry.value().clone()))
            .collect())
    }
}
