//! Session lifecycle manager: login, refresh rotation, logout, password change.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use mediahub_core::config::{AppConfig, AuthConfig};
use mediahub_core::deadline::bounded;
use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::types::AccountId;
use mediahub_database::AccountStore;
use mediahub_entity::{Account, AccountView};

use crate::jwt::{Identity, TokenIssuer, TokenPair, TokenVerifier};
use crate::password::{PasswordHasher, PasswordValidator};

use super::result::{
    ACCESS_TOKEN_COOKIE, CookieDirective, REFRESH_TOKEN_COOKIE, RefreshCredential, SessionResult,
};
use super::store::SessionRecord;

/// Same message for an unknown identity and a wrong password.
const INVALID_CREDENTIALS: &str = "Invalid user credentials";

/// Message for a refresh token that is not the stored one.
const STALE_REFRESH: &str = "Refresh token is expired or used";

/// Login input. At least one of `username` and `email` is required.
#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    /// Handle to log in with.
    pub username: Option<String>,
    /// Email to log in with.
    pub email: Option<String>,
    /// Plaintext password.
    pub password: String,
}

/// Orchestrates the credential store, token issuer, and session record.
#[derive(Clone)]
pub struct SessionManager {
    /// Account persistence.
    accounts: Arc<dyn AccountStore>,
    /// The stored refresh token.
    record: SessionRecord,
    /// Token minting.
    issuer: Arc<TokenIssuer>,
    /// Token checking.
    verifier: Arc<TokenVerifier>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// New-password policy.
    validator: PasswordValidator,
    /// Auth configuration.
    auth_config: AuthConfig,
    /// Deadline for each store call.
    store_timeout: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("issuer", &self.issuer)
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a session manager with all required dependencies.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        issuer: Arc<TokenIssuer>,
        verifier: Arc<TokenVerifier>,
        hasher: Arc<PasswordHasher>,
        auth_config: AuthConfig,
        store_timeout: Duration,
    ) -> Self {
        Self {
            record: SessionRecord::new(Arc::clone(&accounts), store_timeout),
            accounts,
            issuer,
            verifier,
            hasher,
            validator: PasswordValidator::new(&auth_config),
            auth_config,
            store_timeout,
        }
    }

    /// Builds the issuer, verifier, and hasher from configuration.
    pub fn from_config(accounts: Arc<dyn AccountStore>, config: &AppConfig) -> AppResult<Self> {
        Ok(Self::new(
            accounts,
            Arc::new(TokenIssuer::new(&config.auth)?),
            Arc::new(TokenVerifier::new(&config.auth)?),
            Arc::new(PasswordHasher::new(&config.auth)?),
            config.auth.clone(),
            config.store.operation_timeout(),
        ))
    }

    /// The password hasher, shared with account registration.
    pub fn hasher(&self) -> Arc<PasswordHasher> {
        Arc::clone(&self.hasher)
    }

    /// Performs the login flow:
    ///
    /// 1. Look up the account by username, then email
    /// 2. Verify the password (against a decoy hash when no account matched)
    /// 3. Mint a token pair
    /// 4. Store the refresh token, replacing any previous session
    ///
    /// No token pair is returned unless step 4 succeeded.
    pub async fn login(&self, request: LoginRequest) -> AppResult<SessionResult> {
        let username = non_blank(request.username.as_deref());
        let email = non_blank(request.email.as_deref());
        if username.is_none() && email.is_none() {
            return Err(AppError::validation("Username or email is required"));
        }
        if request.password.is_empty() {
            return Err(AppError::validation("Password is required"));
        }

        let Some(account) = bounded(
            "find account by identity",
            self.store_timeout,
            self.accounts.find_by_identity(username, email),
        )
        .await?
        else {
            self.hasher.verify_decoy(&request.password);
            warn!("Login rejected: unknown identity");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !self
            .hasher
            .verify_password(&request.password, &account.password_hash)?
        {
            warn!(account_id = %account.id, "Login rejected: wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let tokens = self.issuer.issue_pair(&Identity::from(&account))?;
        self.record.install(account.id, &tokens.refresh_token).await?;

        info!(account_id = %account.id, "Login successful");

        let cookies = self.session_cookies(&tokens);
        Ok(SessionResult {
            tokens: Some(tokens),
            account: Some(AccountView::from(account)),
            cookies,
        })
    }

    /// Exchanges a refresh token for a new pair:
    ///
    /// 1. Verify signature and expiry
    /// 2. Load the account named by the token
    /// 3. Reject a token that is not the stored one
    /// 4. Mint a new pair
    /// 5. Swap the stored token, conditional on it still being the presented one
    ///
    /// Step 3 only rejects early; step 5 is what makes two concurrent
    /// refreshes with the same token produce exactly one winner.
    pub async fn refresh(&self, credential: &RefreshCredential) -> AppResult<SessionResult> {
        let presented = credential.resolve()?;
        let claims = self.verifier.verify_refresh(presented)?;

        let account = self
            .load(claims.account_id())
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        if !account.holds_refresh_token(presented) {
            warn!(account_id = %account.id, "Refresh rejected: token is not the current one");
            return Err(AppError::unauthorized(STALE_REFRESH));
        }

        let tokens = self.issuer.issue_pair(&Identity::from(&account))?;

        if !self
            .record
            .rotate(account.id, presented, &tokens.refresh_token)
            .await?
        {
            warn!(account_id = %account.id, "Refresh rejected: lost rotation race");
            return Err(AppError::unauthorized(STALE_REFRESH));
        }

        info!(account_id = %account.id, "Token refreshed");

        let cookies = self.session_cookies(&tokens);
        Ok(SessionResult {
            tokens: Some(tokens),
            account: None,
            cookies,
        })
    }

    /// Ends the account's session. Logging out twice is not an error.
    pub async fn logout(&self, account_id: AccountId) -> AppResult<SessionResult> {
        self.record.clear(account_id).await?;

        info!(account_id = %account_id, "Logout completed");

        let secure = self.auth_config.cookie_secure;
        Ok(SessionResult {
            tokens: None,
            account: None,
            cookies: vec![
                CookieDirective::clear(ACCESS_TOKEN_COOKIE, secure),
                CookieDirective::clear(REFRESH_TOKEN_COOKIE, secure),
            ],
        })
    }

    /// Replaces the password of an already-authenticated account.
    ///
    /// The stored refresh token survives unless
    /// `auth.revoke_sessions_on_password_change` is set.
    pub async fn change_password(
        &self,
        account_id: AccountId,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        self.validator.validate(new_password)?;
        self.validator.validate_not_same(old_password, new_password)?;

        let account = self
            .load(account_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account not found"))?;

        if !self
            .hasher
            .verify_password(old_password, &account.password_hash)?
        {
            warn!(account_id = %account_id, "Password change rejected: wrong old password");
            return Err(AppError::unauthorized("Invalid old password"));
        }

        let hash = self.hasher.hash_password(new_password)?;
        let updated = bounded(
            "update password",
            self.store_timeout,
            self.accounts.update_password(account_id, &hash),
        )
        .await?;
        if !updated {
            return Err(AppError::not_found("Account not found"));
        }

        if self.auth_config.revoke_sessions_on_password_change {
            self.record.clear(account_id).await?;
        }

        info!(account_id = %account_id, "Password changed");
        Ok(())
    }

    /// Resolves an access token to the account it was issued for.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<AccountView> {
        let claims = self.verifier.verify_access(access_token.trim())?;
        let account = self
            .load(claims.account_id())
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid access token"))?;
        Ok(AccountView::from(account))
    }

    async fn load(&self, account_id: AccountId) -> AppResult<Option<Account>> {
        bounded(
            "find account",
            self.store_timeout,
            self.accounts.find_by_id(account_id),
        )
        .await
    }

    fn session_cookies(&self, tokens: &TokenPair) -> Vec<CookieDirective> {
        let secure = self.auth_config.cookie_secure;
        vec![
            CookieDirective::set(
                ACCESS_TOKEN_COOKIE,
                &tokens.access_token,
                self.issuer.access_ttl().num_seconds(),
                secure,
            ),
            CookieDirective::set(
                REFRESH_TOKEN_COOKIE,
                &tokens.refresh_token,
                self.issuer.refresh_ttl().num_seconds(),
                secure,
            ),
        ]
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediahub_core::error::ErrorKind;
    use mediahub_database::MemoryStore;
    use mediahub_entity::NewAccount;

    struct Fixture {
        store: MemoryStore,
        manager: SessionManager,
        account_id: AccountId,
    }

    async fn fixture(auth: AuthConfig) -> Fixture {
        let auth = AuthConfig {
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            ..auth
        };
        let config = AppConfig {
            auth,
            ..Default::default()
        };
        let store = MemoryStore::new();
        let manager = SessionManager::from_config(Arc::new(store.clone()), &config).unwrap();
        let account = store
            .create(NewAccount {
                username: "alice".into(),
                email: "alice@example.com".into(),
                full_name: "Alice".into(),
                password_hash: manager.hasher().hash_password("old password").unwrap(),
                avatar: Some("https://cdn.example.com/alice.png".into()),
                cover_image: None,
            })
            .await
            .unwrap();
        Fixture {
            store,
            manager,
            account_id: account.id,
        }
    }

    fn login_as(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.into()),
            email: None,
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_login_stores_returned_refresh_token() {
        let f = fixture(AuthConfig::default()).await;
        let result = f.manager.login(login_as("Alice", "old password")).await.unwrap();

        let tokens = result.tokens.as_ref().unwrap();
        let stored = f.store.find_by_id(f.account_id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some(tokens.refresh_token.as_str()));
        assert_eq!(result.account.as_ref().unwrap().username, "alice");
        assert_eq!(result.cookies.len(), 2);
        assert!(result.cookies.iter().all(|c| c.http_only && c.secure));
        let cookie = result.cookie(REFRESH_TOKEN_COOKIE).unwrap();
        assert_eq!(cookie.value.as_deref(), Some(tokens.refresh_token.as_str()));
        assert!(result.cookie(ACCESS_TOKEN_COOKIE).is_some());
    }

    #[tokio::test]
    async fn test_login_by_email() {
        let f = fixture(AuthConfig::default()).await;
        let request = LoginRequest {
            username: None,
            email: Some(" ALICE@example.com ".into()),
            password: "old password".into(),
        };
        assert!(f.manager.login(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_the_same() {
        let f = fixture(AuthConfig::default()).await;
        let hasher = f.manager.hasher();
        let before = hasher.verification_count();

        let unknown = f.manager.login(login_as("bob", "old password")).await.unwrap_err();
        assert_eq!(hasher.verification_count(), before + 1);
        let wrong = f.manager.login(login_as("alice", "nope")).await.unwrap_err();
        assert_eq!(hasher.verification_count(), before + 2);

        assert_eq!(unknown.kind, ErrorKind::Unauthorized);
        assert_eq!(unknown.kind, wrong.kind);
        assert_eq!(unknown.message, wrong.message);
    }

    #[tokio::test]
    async fn test_login_requires_identity() {
        let f = fixture(AuthConfig::default()).await;
        let err = f.manager.login(login_as("   ", "old password")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_second_login_invalidates_first_session() {
        let f = fixture(AuthConfig::default()).await;
        let first = f.manager.login(login_as("alice", "old password")).await.unwrap();
        f.manager.login(login_as("alice", "old password")).await.unwrap();

        let stale = RefreshCredential::from_body(first.tokens.unwrap().refresh_token);
        let err = f.manager.refresh(&stale).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_refresh_rotates() {
        let f = fixture(AuthConfig::default()).await;
        let login = f.manager.login(login_as("alice", "old password")).await.unwrap();
        let original = login.tokens.unwrap().refresh_token;

        let refreshed = f
            .manager
            .refresh(&RefreshCredential::from_cookie(original.clone()))
            .await
            .unwrap();
        let rotated = refreshed.tokens.unwrap().refresh_token;
        assert_ne!(rotated, original);

        let err = f
            .manager
            .refresh(&RefreshCredential::from_cookie(original))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert_eq!(err.message, STALE_REFRESH);

        let stored = f.store.find_by_id(f.account_id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some(rotated.as_str()));
    }

    #[tokio::test]
    async fn test_refresh_after_logout_fails() {
        let f = fixture(AuthConfig::default()).await;
        let login = f.manager.login(login_as("alice", "old password")).await.unwrap();
        let token = login.tokens.unwrap().refresh_token;

        let logout = f.manager.logout(f.account_id).await.unwrap();
        assert!(logout.cookies.iter().all(CookieDirective::is_clear));
        f.manager.logout(f.account_id).await.unwrap();

        let err = f
            .manager
            .refresh(&RefreshCredential::from_body(token))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_change_password_keeps_session_by_default() {
        let f = fixture(AuthConfig::default()).await;
        let login = f.manager.login(login_as("alice", "old password")).await.unwrap();

        let err = f
            .manager
            .change_password(f.account_id, "wrong password", "new password")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);

        f.manager
            .change_password(f.account_id, "old password", "new password")
            .await
            .unwrap();

        assert!(f.manager.login(login_as("alice", "old password")).await.is_err());
        let refreshed = f
            .manager
            .refresh(&RefreshCredential::from_body(login.tokens.unwrap().refresh_token))
            .await;
        assert!(refreshed.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_can_revoke_session() {
        let f = fixture(AuthConfig {
            revoke_sessions_on_password_change: true,
            ..Default::default()
        })
        .await;
        f.manager.login(login_as("alice", "old password")).await.unwrap();
        f.manager
            .change_password(f.account_id, "old password", "new password")
            .await
            .unwrap();

        let stored = f.store.find_by_id(f.account_id).await.unwrap().unwrap();
        assert!(stored.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_change_password_validates_new() {
        let f = fixture(AuthConfig::default()).await;
        let err = f
            .manager
            .change_password(f.account_id, "old password", "")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = f
            .manager
            .change_password(f.account_id, "old password", "old password")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_authenticate_with_access_token() {
        let f = fixture(AuthConfig::default()).await;
        let login = f.manager.login(login_as("alice", "old password")).await.unwrap();
        let tokens = login.tokens.unwrap();

        let view = f.manager.authenticate(&tokens.access_token).await.unwrap();
        assert_eq!(view.id, f.account_id);

        let err = f.manager.authenticate(&tokens.refresh_token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }
}
