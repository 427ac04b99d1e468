//! Session lifecycle: login, refresh rotation, logout, and password change.

pub mod manager;
pub mod result;
pub mod store;

pub use manager::{LoginRequest, SessionManager};
pub use result::{
    ACCESS_TOKEN_COOKIE, CookieDirective, REFRESH_TOKEN_COOKIE, RefreshCredential, SessionResult,
};
pub use store::SessionRecord;
