//! JWT token issuance, verification, and claims.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{Claims, Identity, TokenType};
pub use decoder::TokenVerifier;
pub use encoder::{TokenIssuer, TokenPair};
