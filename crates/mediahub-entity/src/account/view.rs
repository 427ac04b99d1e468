//! Sanitized account projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mediahub_core::types::{AccountId, MediaId};

use super::model::Account;

/// The account as returned to callers: no credential, no refresh token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    /// Account identifier.
    pub id: AccountId,
    /// Handle.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Primary image URL.
    pub avatar: Option<String>,
    /// Banner image URL.
    pub cover_image: Option<String>,
    /// Watched media ids, oldest first.
    pub watch_history: Vec<MediaId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            full_name: account.full_name.clone(),
            avatar: account.avatar.clone(),
            cover_image: account.cover_image.clone(),
            watch_history: account.watch_history.clone(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self::from(&account)
    }
}
