//! Session commands: login, refresh, logout, change-password.

use clap::{ArgGroup, Args};
use serde::Serialize;

use mediahub_auth::{LoginRequest, RefreshCredential, SessionResult};
use mediahub_core::error::AppError;

use super::Services;
use crate::output::{self, OutputFormat};

/// Arguments for `login`
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("identity").required(true).multiple(true).args(["username", "email"])))]
pub struct LoginArgs {
    /// Username
    #[arg(long)]
    pub username: Option<String>,
    /// Email address
    #[arg(long)]
    pub email: Option<String>,
    /// Password
    #[arg(long)]
    pub password: String,
}

/// Arguments for `refresh`
#[derive(Debug, Args)]
pub struct RefreshArgs {
    /// Refresh token, as a cookie-carrying client would present it.
    /// Takes precedence over `--token`.
    #[arg(long)]
    pub cookie: Option<String>,
    /// Refresh token, as a JSON body would carry it
    #[arg(long)]
    pub token: Option<String>,
}

/// Arguments for commands acting on the access token's owner
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Access token
    #[arg(long)]
    pub access_token: String,
}

/// Arguments for `change-password`
#[derive(Debug, Args)]
pub struct ChangePasswordArgs {
    /// Access token
    #[arg(long)]
    pub access_token: String,
    /// Current password
    #[arg(long)]
    pub old_password: String,
    /// New password
    #[arg(long)]
    pub new_password: String,
}

/// What a session command reports back. Raw tokens are shown because the
/// caller needs them for follow-up commands.
#[derive(Debug, Serialize)]
struct SessionOutput {
    account_id: Option<String>,
    username: Option<String>,
    access_token: Option<String>,
    access_expires_at: Option<String>,
    refresh_token: Option<String>,
    refresh_expires_at: Option<String>,
}

impl From<&SessionResult> for SessionOutput {
    fn from(result: &SessionResult) -> Self {
        let tokens = result.tokens.as_ref();
        let account = result.account.as_ref();
        Self {
            account_id: account.map(|a| a.id.to_string()),
            username: account.map(|a| a.username.clone()),
            access_token: tokens.map(|t| t.access_token.clone()),
            access_expires_at: tokens.map(|t| t.access_expires_at.to_rfc3339()),
            refresh_token: tokens.map(|t| t.refresh_token.clone()),
            refresh_expires_at: tokens.map(|t| t.refresh_expires_at.to_rfc3339()),
        }
    }
}

/// Execute `login`
pub async fn login(
    args: &LoginArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    let result = services
        .sessions
        .login(LoginRequest {
            username: args.username.clone(),
            email: args.email.clone(),
            password: args.password.clone(),
        })
        .await?;

    output::print_success("Logged in");
    output::print_fields(&SessionOutput::from(&result), format);
    Ok(())
}

/// Execute `refresh`
pub async fn refresh(
    args: &RefreshArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    let credential = RefreshCredential {
        cookie: args.cookie.clone(),
        body: args.token.clone(),
    };
    let result = services.sessions.refresh(&credential).await?;

    output::print_success("Access token refreshed");
    output::print_fields(&SessionOutput::from(&result), format);
    Ok(())
}

/// Execute `logout`
pub async fn logout(args: &TokenArgs, services: &Services) -> Result<(), AppError> {
    let account = services.sessions.authenticate(&args.access_token).await?;
    services.sessions.logout(account.id).await?;
    output::print_success(&format!("User '{}' logged out", account.username));
    Ok(())
}

/// Execute `change-password`
pub async fn change_password(
    args: &ChangePasswordArgs,
    services: &Services,
) -> Result<(), AppError> {
    let account = services.sessions.authenticate(&args.access_token).await?;
    services
        .sessions
        .change_password(account.id, &args.old_password, &args.new_password)
        .await?;
    output::print_success("Password changed successfully");
    Ok(())
}
