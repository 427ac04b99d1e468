//! JWT claims carried by access and refresh tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mediahub_core::types::AccountId;
use mediahub_entity::Account;

/// Identity fields a token is minted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Account the token is bound to.
    pub account_id: AccountId,
    /// Handle, embedded in access tokens.
    pub username: String,
    /// Email, embedded in access tokens.
    pub email: String,
    /// Display name, embedded in access tokens.
    pub full_name: String,
}

impl From<&Account> for Identity {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            full_name: account.full_name.clone(),
        }
    }
}

/// JWT claims payload.
///
/// Refresh tokens carry only the subject; access tokens also carry the
/// profile fields so the request layer can render them without a lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account ID.
    pub sub: AccountId,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Random token ID; two tokens minted in the same second still differ.
    pub jti: Uuid,
    /// Token type: "access" or "refresh".
    pub token_type: TokenType,
    /// Username, access tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Email, access tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name, access tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token for API requests.
    Access,
    /// Long-lived refresh token for obtaining a new pair.
    Refresh,
}

impl Claims {
    /// Returns the account ID from the subject claim.
    pub fn account_id(&self) -> AccountId {
        self.sub
    }
}
