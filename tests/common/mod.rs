//! Shared helpers for workspace integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use mediahub_auth::{LoginRequest, PasswordHasher, SessionManager};
use mediahub_core::config::{AppConfig, AuthConfig};
use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::types::{AccountId, MediaId};
use mediahub_database::{AccountStore, MemoryStore, RelationStore, Stores};
use mediahub_entity::{Account, AccountPatch, MediaItem, NewAccount, PasswordHash};
use mediahub_service::AggregatorService;

/// Password every fixture account is created with.
pub const PASSWORD: &str = "correct horse battery";

/// Configuration with fixed secrets and cheap Argon2 parameters.
pub fn test_config() -> AppConfig {
    AppConfig {
        auth: AuthConfig {
            access_token_secret: "integration-access-secret".into(),
            refresh_token_secret: "integration-refresh-secret".into(),
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// In-memory store plus the services under test.
pub struct TestApp {
    pub store: MemoryStore,
    pub sessions: Arc<SessionManager>,
    pub aggregator: AggregatorService,
    pub config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        let sessions = SessionManager::from_config(Arc::new(store.clone()), &config)
            .expect("session manager should build");
        let aggregator = AggregatorService::new(
            &Stores::from_memory(store.clone()),
            config.store.operation_timeout(),
        );
        Self {
            store,
            sessions: Arc::new(sessions),
            aggregator,
            config,
        }
    }

    /// Creates an account whose password is [`PASSWORD`].
    pub async fn account(&self, username: &str) -> Account {
        let hasher = PasswordHasher::new(&self.config.auth).expect("hasher");
        self.store
            .create(NewAccount {
                username: username.into(),
                email: format!("{username}@example.com"),
                full_name: format!("{username} tester"),
                password_hash: hasher.hash_password(PASSWORD).expect("hash"),
                avatar: Some(format!("https://cdn.example.com/{username}.png")),
                cover_image: None,
            })
            .await
            .expect("account should be created")
    }

    /// Stored state of an account.
    pub async fn reload(&self, id: AccountId) -> Account {
        self.store
            .find_by_id(id)
            .await
            .expect("store read")
            .expect("account exists")
    }

    pub async fn media(&self, owner: &Account, title: &str) -> MediaItem {
        self.store
            .create_media(&MediaItem {
                id: MediaId::new(),
                owner_id: owner.id,
                title: title.into(),
                description: format!("{title} description"),
                video_url: format!("https://cdn.example.com/{title}.mp4"),
                thumbnail_url: format!("https://cdn.example.com/{title}.jpg"),
                duration_seconds: 90.0,
                views: 0,
                is_published: true,
                created_at: Utc::now(),
            })
            .await
            .expect("media should be created")
    }
}

pub fn login_by_username(username: &str) -> LoginRequest {
    LoginRequest {
        username: Some(username.into()),
        email: None,
        password: PASSWORD.into(),
    }
}

/// An account store whose session writes can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyAccountStore {
    pub inner: MemoryStore,
    pub fail_session_writes: AtomicBool,
}

impl FlakyAccountStore {
    pub fn fail(&self) {
        self.fail_session_writes.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> AppResult<()> {
        if self.fail_session_writes.load(Ordering::SeqCst) {
            return Err(AppError::upstream("store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for FlakyAccountStore {
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        self.inner.find_by_username(username).await
    }

    async fn find_by_identity(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<Option<Account>> {
        self.inner.find_by_identity(username, email).await
    }

    async fn identity_taken(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<AccountId>,
    ) -> AppResult<bool> {
        self.inner.identity_taken(username, email, except).await
    }

    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        self.inner.create(account).await
    }

    async fn update_fields(
        &self,
        id: AccountId,
        patch: &AccountPatch,
    ) -> AppResult<Option<Account>> {
        self.inner.update_fields(id, patch).await
    }

    async fn update_password(&self, id: AccountId, hash: &PasswordHash) -> AppResult<bool> {
        self.inner.update_password(id, hash).await
    }

    async fn set_refresh_token(&self, id: AccountId, token: Option<&str>) -> AppResult<bool> {
        self.check()?;
        self.inner.set_refresh_token(id, token).await
    }

    async fn compare_and_swap_refresh_token(
        &self,
        id: AccountId,
        expected: &str,
        new: Option<&str>,
    ) -> AppResult<bool> {
        self.check()?;
        self.inner
            .compare_and_swap_refresh_token(id, expected, new)
            .await
    }

    async fn record_watch(&self, id: AccountId, media_id: MediaId) -> AppResult<bool> {
        self.inner.record_watch(id, media_id).await
    }
}
