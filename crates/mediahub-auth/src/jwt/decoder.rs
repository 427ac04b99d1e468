//! JWT signature, expiry, and type validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use mediahub_core::config::AuthConfig;
use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;

use super::claims::{Claims, TokenType};
use super::encoder::validate_secrets;

/// The single failure every rejected token collapses to. Callers cannot
/// tell a bad signature from an expired or mistyped token.
const INVALID_TOKEN: &str = "Invalid or expired token";

/// Verifies access and refresh tokens against their own secrets.
#[derive(Clone)]
pub struct TokenVerifier {
    access_key: DecodingKey,
    refresh_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Creates a verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        validate_secrets(config)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // seconds of clock skew

        Ok(Self {
            access_key: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            validation,
        })
    }

    /// Decodes and validates an access token.
    pub fn verify_access(&self, token: &str) -> AppResult<Claims> {
        self.verify(token, TokenType::Access)
    }

    /// Decodes and validates a refresh token.
    pub fn verify_refresh(&self, token: &str) -> AppResult<Claims> {
        self.verify(token, TokenType::Refresh)
    }

    /// Checks signature (with the secret for `expected`), expiry, and type.
    pub fn verify(&self, token: &str, expected: TokenType) -> AppResult<Claims> {
        let key = match expected {
            TokenType::Access => &self.access_key,
            TokenType::Refresh => &self.refresh_key,
        };

        let claims = decode::<Claims>(token, key, &self.validation)
            .map_err(|e| {
                debug!(reason = %e, token_type = ?expected, "Token rejected");
                AppError::unauthorized(INVALID_TOKEN)
            })?
            .claims;

        if claims.token_type != expected {
            debug!(token_type = ?expected, "Token rejected: wrong type");
            return Err(AppError::unauthorized(INVALID_TOKEN));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{Identity, TokenIssuer};
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use mediahub_core::error::ErrorKind;
    use mediahub_core::types::AccountId;
    use uuid::Uuid;

    fn setup() -> (TokenIssuer, TokenVerifier, Identity) {
        let config = AuthConfig::default();
        let identity = Identity {
            account_id: AccountId::new(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            full_name: "Alice".into(),
        };
        (
            TokenIssuer::new(&config).unwrap(),
            TokenVerifier::new(&config).unwrap(),
            identity,
        )
    }

    #[test]
    fn test_verifies_own_tokens() {
        let (issuer, verifier, identity) = setup();
        let pair = issuer.issue_pair(&identity).unwrap();

        let access = verifier.verify_access(&pair.access_token).unwrap();
        assert_eq!(access.account_id(), identity.account_id);
        assert_eq!(access.username.as_deref(), Some("alice"));

        let refresh = verifier.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.account_id(), identity.account_id);
        assert!(refresh.username.is_none());
    }

    #[test]
    fn test_tokens_are_not_interchangeable() {
        let (issuer, verifier, identity) = setup();
        let pair = issuer.issue_pair(&identity).unwrap();

        let err = verifier.verify_refresh(&pair.access_token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        let err = verifier.verify_access(&pair.refresh_token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn test_expired_and_garbage_look_the_same() {
        let (_, verifier, identity) = setup();
        let now = Utc::now().timestamp();
        let expired = Claims {
            sub: identity.account_id,
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4(),
            token_type: TokenType::Refresh,
            username: None,
            email: None,
            full_name: None,
        };
        let secret = AuthConfig::default().refresh_token_secret;
        let token = encode(
            &Header::default(),
            &expired,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let expired_err = verifier.verify_refresh(&token).unwrap_err();
        let garbage_err = verifier.verify_refresh("not.a.token").unwrap_err();
        assert_eq!(expired_err.kind, ErrorKind::Unauthorized);
        assert_eq!(expired_err.message, garbage_err.message);
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let (issuer, _, identity) = setup();
        let other = TokenVerifier::new(&AuthConfig {
            access_token_secret: "another-access".into(),
            refresh_token_secret: "another-refresh".into(),
            ..Default::default()
        })
        .unwrap();
        let pair = issuer.issue_pair(&identity).unwrap();
        assert!(other.verify_access(&pair.access_token).is_err());
    }
}
