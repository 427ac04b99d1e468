//! Account registration command.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use mediahub_core::error::{AppError, ErrorKind};
use mediahub_core::traits::AssetUpload;
use mediahub_entity::AccountView;
use mediahub_service::RegisterAccount;

use super::Services;
use crate::output::{self, OutputFormat};

/// Arguments for `register`
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Username (stored lower-cased)
    #[arg(long)]
    pub username: String,
    /// Email address
    #[arg(long)]
    pub email: String,
    /// Display name
    #[arg(long)]
    pub full_name: String,
    /// Password
    #[arg(long)]
    pub password: String,
    /// Path to the avatar image
    #[arg(long)]
    pub avatar: PathBuf,
    /// Path to the cover image
    #[arg(long)]
    pub cover_image: Option<PathBuf>,
}

/// Account display row for table output
#[derive(Debug, Serialize, Tabled)]
pub(crate) struct AccountRow {
    /// Account ID
    id: String,
    /// Username
    username: String,
    /// Email
    email: String,
    /// Full name
    full_name: String,
    /// Avatar URL
    avatar: String,
    /// Created at
    created_at: String,
}

impl From<&AccountView> for AccountRow {
    fn from(view: &AccountView) -> Self {
        Self {
            id: view.id.to_string(),
            username: view.username.clone(),
            email: view.email.clone(),
            full_name: view.full_name.clone(),
            avatar: view.avatar.clone().unwrap_or_default(),
            created_at: view.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute `register`
pub async fn register(
    args: &RegisterArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    let avatar = read_upload(&args.avatar).await?;
    let cover_image = match &args.cover_image {
        Some(path) => Some(read_upload(path).await?),
        None => None,
    };

    let view = services
        .accounts
        .register(RegisterAccount {
            full_name: args.full_name.clone(),
            email: args.email.clone(),
            username: args.username.clone(),
            password: args.password.clone(),
            avatar: Some(avatar),
            cover_image,
        })
        .await?;

    output::print_success(&format!("Account '{}' registered", view.username));
    output::print_item(&AccountRow::from(&view), format);
    Ok(())
}

/// Reads a local image into an upload.
pub(crate) async fn read_upload(path: &Path) -> Result<AssetUpload, AppError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Validation,
            format!("Cannot read '{}'", path.display()),
            e,
        )
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(AssetUpload::new(file_name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_validation() {
        let err = read_upload(Path::new("/nonexistent/avatar.png"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
