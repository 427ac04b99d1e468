//! # mediahub-auth
//!
//! Credential and session lifecycle for MediaHub.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing, verification, and password policy
//! - `jwt`: access/refresh token issuance and verification
//! - `session`: the stored refresh token and the login/refresh/logout flows

pub mod jwt;
pub mod password;
pub mod session;

pub use jwt::{Claims, TokenIssuer, TokenPair, TokenType, TokenVerifier};
pub use password::{PasswordHasher, PasswordValidator};
pub use session::{
    CookieDirective, LoginRequest, RefreshCredential, SessionManager, SessionRecord, SessionResult,
};
