//! Account self-service: registration, profile details, and images.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use validator::Validate;

use mediahub_auth::password::{PasswordHasher, PasswordValidator};
use mediahub_core::config::AuthConfig;
use mediahub_core::deadline::bounded;
use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::traits::{AssetHost, AssetUpload};
use mediahub_core::types::AccountId;
use mediahub_database::AccountStore;
use mediahub_entity::account::{normalize_email, normalize_username};
use mediahub_entity::{AccountPatch, AccountView, NewAccount};

use crate::validation::validation_error;

/// Registration input.
#[derive(Debug, Clone, Validate)]
pub struct RegisterAccount {
    /// Display name.
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    /// Email address.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Handle; stored lower-cased.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Primary image. Required.
    pub avatar: Option<AssetUpload>,
    /// Banner image.
    pub cover_image: Option<AssetUpload>,
}

/// Profile details update. Both fields are required.
#[derive(Debug, Clone, Validate)]
pub struct UpdateAccountDetails {
    /// New display name.
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    /// New email address.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

/// Which image slot an upload goes to.
#[derive(Debug, Clone, Copy)]
enum ImageSlot {
    Avatar,
    CoverImage,
}

impl ImageSlot {
    fn label(self) -> &'static str {
        match self {
            Self::Avatar => "Avatar",
            Self::CoverImage => "Cover image",
        }
    }
}

/// Handles account creation and self-service updates.
#[derive(Debug, Clone)]
pub struct AccountService {
    /// Account persistence.
    accounts: Arc<dyn AccountStore>,
    /// Image host.
    assets: Arc<dyn AssetHost>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password policy.
    validator: PasswordValidator,
    /// Deadline for each store call.
    store_timeout: Duration,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        assets: Arc<dyn AssetHost>,
        hasher: Arc<PasswordHasher>,
        auth_config: &AuthConfig,
        store_timeout: Duration,
    ) -> Self {
        Self {
            accounts,
            assets,
            hasher,
            validator: PasswordValidator::new(auth_config),
            store_timeout,
        }
    }

    /// Registers a new account.
    ///
    /// 1. Validate required fields and the password policy
    /// 2. Reject a taken username or email
    /// 3. Upload the avatar (and cover image, if given)
    /// 4. Hash the password and persist the account
    pub async fn register(&self, req: RegisterAccount) -> AppResult<AccountView> {
        let req = RegisterAccount {
            full_name: req.full_name.trim().to_string(),
            email: normalize_email(&req.email),
            username: normalize_username(&req.username),
            ..req
        };
        req.validate().map_err(validation_error)?;
        self.validator.validate(&req.password)?;

        let avatar = req
            .avatar
            .filter(|upload| !upload.is_empty())
            .ok_or_else(|| AppError::validation("Avatar file is required"))?;
        let cover_image = req.cover_image.filter(|upload| !upload.is_empty());

        let taken = bounded(
            "check identity",
            self.store_timeout,
            self.accounts
                .identity_taken(Some(&req.username), Some(&req.email), None),
        )
        .await?;
        if taken {
            return Err(AppError::conflict(
                "User with email or username already exists",
            ));
        }

        let avatar_url = self.upload(ImageSlot::Avatar, avatar).await?;
        let cover_url = match cover_image {
            Some(upload) => Some(self.upload(ImageSlot::CoverImage, upload).await?),
            None => None,
        };

        let password_hash = self.hasher.hash_password(&req.password)?;
        let account = bounded(
            "create account",
            self.store_timeout,
            self.accounts.create(NewAccount {
                username: req.username,
                email: req.email,
                full_name: req.full_name,
                password_hash,
                avatar: Some(avatar_url),
                cover_image: cover_url,
            }),
        )
        .await?;

        info!(account_id = %account.id, username = %account.username, "Account registered");
        Ok(AccountView::from(account))
    }

    /// The caller's own account.
    pub async fn current_account(&self, account_id: AccountId) -> AppResult<AccountView> {
        bounded(
            "find account",
            self.store_timeout,
            self.accounts.find_by_id(account_id),
        )
        .await?
        .map(AccountView::from)
        .ok_or_else(|| AppError::not_found("Account not found"))
    }

    /// Replaces display name and email.
    pub async fn update_account_details(
        &self,
        account_id: AccountId,
        req: UpdateAccountDetails,
    ) -> AppResult<AccountView> {
        let req = UpdateAccountDetails {
            full_name: req.full_name.trim().to_string(),
            email: normalize_email(&req.email),
        };
        req.validate().map_err(validation_error)?;

        let taken = bounded(
            "check email",
            self.store_timeout,
            self.accounts
                .identity_taken(None, Some(&req.email), Some(account_id)),
        )
        .await?;
        if taken {
            return Err(AppError::conflict("Email is already in use"));
        }

        let patch = AccountPatch {
            full_name: Some(req.full_name),
            email: Some(req.email),
            ..Default::default()
        };
        let view = self.apply(account_id, patch).await?;

        info!(account_id = %account_id, "Account details updated");
        Ok(view)
    }

    /// Uploads a new avatar and points the account at it.
    pub async fn update_avatar(
        &self,
        account_id: AccountId,
        upload: AssetUpload,
    ) -> AppResult<AccountView> {
        self.replace_image(account_id, ImageSlot::Avatar, upload).await
    }

    /// Uploads a new cover image and points the account at it.
    pub async fn update_cover_image(
        &self,
        account_id: AccountId,
        upload: AssetUpload,
    ) -> AppResult<AccountView> {
        self.replace_image(account_id, ImageSlot::CoverImage, upload)
            .await
    }

    async fn replace_image(
        &self,
        account_id: AccountId,
        slot: ImageSlot,
        upload: AssetUpload,
    ) -> AppResult<AccountView> {
        if upload.is_empty() {
            return Err(AppError::validation(format!(
                "{} file is missing",
                slot.label()
            )));
        }

        let url = self.upload(slot, upload).await?;
        let patch = match slot {
            ImageSlot::Avatar => AccountPatch {
                avatar: Some(url),
                ..Default::default()
            },
            ImageSlot::CoverImage => AccountPatch {
                cover_image: Some(url),
                ..Default::default()
            },
        };
        let view = self.apply(account_id, patch).await?;

        info!(account_id = %account_id, slot = slot.label(), "Image updated");
        Ok(view)
    }

    async fn upload(&self, slot: ImageSlot, upload: AssetUpload) -> AppResult<String> {
        match self.assets.upload(upload).await {
            Ok(uploaded) => Ok(uploaded.url),
            Err(e) => {
                error!(
                    provider = self.assets.provider_type(),
                    slot = slot.label(),
                    error = %e,
                    "Asset upload failed"
                );
                Err(AppError::new(
                    e.kind,
                    format!("{} upload failed: {}", slot.label(), e.message),
                ))
            }
        }
    }

    async fn apply(&self, account_id: AccountId, patch: AccountPatch) -> AppResult<AccountView> {
        bounded(
            "update account",
            self.store_timeout,
            self.accounts.update_fields(account_id, &patch),
        )
        .await?
        .map(AccountView::from)
        .ok_or_else(|| AppError::not_found("Account not found"))
    }
}
