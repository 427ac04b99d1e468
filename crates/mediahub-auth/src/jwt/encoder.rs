//! Token issuance with separate secrets and TTLs per token type.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mediahub_core::config::AuthConfig;
use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;

use super::claims::{Claims, Identity, TokenType};

/// Mints signed access and refresh tokens.
///
/// Pure: no I/O and no side effects. Secrets and TTLs come from the
/// [`AuthConfig`] handed in at construction.
#[derive(Clone)]
pub struct TokenIssuer {
    access_key: EncodingKey,
    refresh_key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

/// A freshly minted access + refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer from auth configuration.
    ///
    /// Fails with a configuration error if either secret is empty or both
    /// secrets are the same, since a shared secret would let one token type
    /// stand in for the other.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        validate_secrets(config)?;
        if config.access_token_ttl_minutes == 0 || config.refresh_token_ttl_days == 0 {
            return Err(AppError::configuration("Token TTLs must be positive"));
        }

        Ok(Self {
            access_key: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_token_ttl_minutes as i64),
            refresh_ttl: Duration::days(config.refresh_token_ttl_days as i64),
        })
    }

    /// Signs an access token carrying the account's profile claims.
    pub fn issue_access_token(&self, identity: &Identity) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let exp = now + self.access_ttl;
        let claims = Claims {
            sub: identity.account_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Access,
            username: Some(identity.username.clone()),
            email: Some(identity.email.clone()),
            full_name: Some(identity.full_name.clone()),
        };

        let token = encode(&Header::default(), &claims, &self.access_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;
        Ok((token, exp))
    }

    /// Signs a refresh token carrying only the subject.
    pub fn issue_refresh_token(&self, identity: &Identity) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let exp = now + self.refresh_ttl;
        let claims = Claims {
            sub: identity.account_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Refresh,
            username: None,
            email: None,
            full_name: None,
        };

        let token = encode(&Header::default(), &claims, &self.refresh_key)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;
        Ok((token, exp))
    }

    /// Mints both tokens. Either both are returned or the call fails.
    pub fn issue_pair(&self, identity: &Identity) -> AppResult<TokenPair> {
        let (access_token, access_expires_at) = self.issue_access_token(identity)?;
        let (refresh_token, refresh_expires_at) = self.issue_refresh_token(identity)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }

    /// Access token lifetime, used for cookie max-age.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Refresh token lifetime, used for cookie max-age.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

pub(crate) fn validate_secrets(config: &AuthConfig) -> AppResult<()> {
    if config.access_token_secret.is_empty() || config.refresh_token_secret.is_empty() {
        return Err(AppError::configuration("Token secrets must not be empty"));
    }
    if config.access_token_secret == config.refresh_token_secret {
        return Err(AppError::configuration(
            "Access and refresh token secrets must differ",
        ));
    }
    Ok(())
}
