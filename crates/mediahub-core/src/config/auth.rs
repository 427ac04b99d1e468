//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token, credential, and cookie configuration.
///
/// Passed explicitly to the token issuer and session manager at
/// construction time; nothing reads secrets from the environment later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access tokens.
    #[serde(default = "default_access_secret")]
    pub access_token_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// HMAC-SHA256 secret for refresh tokens. Must differ from the access secret.
    #[serde(default = "default_refresh_secret")]
    pub refresh_token_secret: String,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Reject passwords zxcvbn scores below 3.
    #[serde(default)]
    pub password_require_strong: bool,
    /// Argon2id memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2id iteration count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2id lane count.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
    /// Whether session cookies carry the `Secure` attribute.
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    /// Clear the stored refresh token when the password changes.
    #[serde(default)]
    pub revoke_sessions_on_password_change: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: default_access_secret(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_secret: default_refresh_secret(),
            refresh_token_ttl_days: default_refresh_ttl(),
            password_min_length: default_password_min(),
            password_require_strong: false,
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            cookie_secure: true,
            revoke_sessions_on_password_change: false,
        }
    }
}

fn default_access_secret() -> String {
    "CHANGE_ME_ACCESS_SECRET".to_string()
}

fn default_refresh_secret() -> String {
    "CHANGE_ME_REFRESH_SECRET".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    10
}

fn default_password_min() -> usize {
    8
}

fn default_argon2_memory() -> u32 {
    19 * 1024
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

fn default_true() -> bool {
    true
}
