//! Account entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use mediahub_core::types::{AccountId, MediaId};

/// One-way password credential in PHC string format.
///
/// Never printed and never serialized.
#[derive(Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps an already-computed PHC hash string.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// The PHC string, for verification and persistence only.
    pub fn as_phc(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// A registered account as persisted by the store.
///
/// Deliberately not `Serialize`: convert to
/// [`AccountView`](super::AccountView) before anything leaves the core.
#[derive(Clone, FromRow)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,
    /// Unique, lower-cased handle.
    pub username: String,
    /// Unique, lower-cased email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Primary image URL.
    pub avatar: Option<String>,
    /// Banner image URL.
    pub cover_image: Option<String>,
    /// Argon2id credential.
    pub password_hash: PasswordHash,
    /// The single live refresh token, if a session exists.
    pub refresh_token: Option<String>,
    /// Watched media, oldest first.
    pub watch_history: Vec<MediaId>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Whether `presented` is exactly the stored refresh token.
    pub fn holds_refresh_token(&self, presented: &str) -> bool {
        self.refresh_token.as_deref() == Some(presented)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("has_session", &self.refresh_token.is_some())
            .field("watch_history", &self.watch_history.len())
            .finish_non_exhaustive()
    }
}

/// Data required to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Normalized username.
    pub username: String,
    /// Normalized email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Pre-hashed password.
    pub password_hash: PasswordHash,
    /// Primary image URL.
    pub avatar: Option<String>,
    /// Banner image URL.
    pub cover_image: Option<String>,
}

/// Partial update of profile fields.
///
/// Has no credential or refresh token field, so applying a patch never
/// rehashes a password or touches a session.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    /// New display name.
    pub full_name: Option<String>,
    /// New normalized email.
    pub email: Option<String>,
    /// New primary image URL.
    pub avatar: Option<String>,
    /// New banner image URL.
    pub cover_image: Option<String>,
}

impl AccountPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.avatar.is_none()
            && self.cover_image.is_none()
    }

    /// Applies the patch to an in-memory account.
    pub fn apply_to(&self, account: &mut Account) {
        if let Some(full_name) = &self.full_name {
            account.full_name = full_name.clone();
        }
        if let Some(email) = &self.email {
            account.email = email.clone();
        }
        if let Some(avatar) = &self.avatar {
            account.avatar = Some(avatar.clone());
        }
        if let Some(cover_image) = &self.cover_image {
            account.cover_image = Some(cover_image.clone());
        }
        account.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(),
            username: "hitesh".into(),
            email: "hitesh@example.com".into(),
            full_name: "Hitesh".into(),
            avatar: None,
            cover_image: None,
            password_hash: PasswordHash::from_phc("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA"),
            refresh_token: Some("secret-refresh".into()),
            watch_history: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_debug_hides_secrets() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("secret-refresh"));
        assert!(!rendered.contains("argon2id"));
        assert!(rendered.contains("has_session: true"));
    }

    #[test]
    fn test_holds_refresh_token_is_exact() {
        let account = sample();
        assert!(account.holds_refresh_token("secret-refresh"));
        assert!(!account.holds_refresh_token("secret-refresh "));
        assert!(!account.holds_refresh_token(""));
    }

    #[test]
    fn test_patch_leaves_unset_fields() {
        let mut account = sample();
        AccountPatch {
            avatar: Some("https://cdn/a.png".into()),
            ..Default::default()
        }
        .apply_to(&mut account);
        assert_eq!(account.avatar.as_deref(), Some("https://cdn/a.png"));
        assert_eq!(account.full_name, "Hitesh");
        assert!(account.refresh_token.is_some());
    }
}
