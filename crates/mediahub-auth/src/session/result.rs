//! The value a session operation hands back to the transport layer.

use serde::{Deserialize, Serialize};

use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_entity::AccountView;

use crate::jwt::TokenPair;

/// Cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// An instruction to set or clear one cookie.
///
/// The transport decides how to realize it as a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieDirective {
    /// Cookie name.
    pub name: String,
    /// New value, or `None` to clear the cookie.
    pub value: Option<String>,
    /// Hide from client-side scripts.
    pub http_only: bool,
    /// Only send over TLS.
    pub secure: bool,
    /// Lifetime in seconds. Zero when clearing.
    pub max_age_seconds: i64,
}

impl CookieDirective {
    /// Sets `name` to `value` for `max_age_seconds`.
    pub fn set(
        name: impl Into<String>,
        value: impl Into<String>,
        max_age_seconds: i64,
        secure: bool,
    ) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            http_only: true,
            secure,
            max_age_seconds,
        }
    }

    /// Clears `name`.
    pub fn clear(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            value: None,
            http_only: true,
            secure,
            max_age_seconds: 0,
        }
    }

    /// Whether this directive removes the cookie.
    pub fn is_clear(&self) -> bool {
        self.value.is_none()
    }
}

/// Outcome of login, refresh, or logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    /// The new token pair (login and refresh).
    pub tokens: Option<TokenPair>,
    /// The sanitized account (login only).
    pub account: Option<AccountView>,
    /// Cookies to set or clear.
    pub cookies: Vec<CookieDirective>,
}

impl SessionResult {
    /// Looks up a cookie directive by name.
    pub fn cookie(&self, name: &str) -> Option<&CookieDirective> {
        self.cookies.iter().find(|c| c.name == name)
    }
}

/// The refresh token as presented by the client.
///
/// Browser clients send it as a cookie; other clients put it in the JSON
/// body. The cookie wins when both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshCredential {
    /// Value of the `refreshToken` cookie.
    pub cookie: Option<String>,
    /// `refreshToken` field of the request body.
    pub body: Option<String>,
}

impl RefreshCredential {
    /// A credential presented only as a cookie.
    pub fn from_cookie(token: impl Into<String>) -> Self {
        Self {
            cookie: Some(token.into()),
            body: None,
        }
    }

    /// A credential presented only in the body.
    pub fn from_body(token: impl Into<String>) -> Self {
        Self {
            cookie: None,
            body: Some(token.into()),
        }
    }

    /// The token to check. Blank values count as absent.
    pub fn resolve(&self) -> AppResult<&str> {
        [self.cookie.as_deref(), self.body.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|token| !token.is_empty())
            .ok_or_else(|| AppError::unauthorized("Unauthorized request"))
    }
}
