//! Account repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::types::{AccountId, MediaId};
use mediahub_entity::account::{normalize_email, normalize_username};
use mediahub_entity::{Account, AccountPatch, NewAccount, PasswordHash};

use super::{db_error, is_foreign_key_violation, violated_unique};
use crate::store::AccountStore;

/// Column list shared by every account read. Watch history is folded in
/// as an ordered array so an [`Account`] always comes back whole.
pub(super) const ACCOUNT_SELECT: &str = "SELECT a.id, a.username, a.email, a.full_name, a.avatar, \
     a.cover_image, a.password_hash, a.refresh_token, a.created_at, a.updated_at, \
     ARRAY(SELECT h.media_id FROM account_watch_history h \
           WHERE h.account_id = a.id ORDER BY h.id) AS watch_history \
     FROM accounts a";

/// PostgreSQL-backed [`AccountStore`].
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a new account repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique violation on insert or update to a conflict naming the key.
fn conflict_or_upstream(err: sqlx::Error, context: &'static str) -> AppError {
    match violated_unique(&err).as_deref() {
        Some("accounts_username_key") => AppError::conflict("Username is already taken"),
        Some("accounts_email_key") => AppError::conflict("Email is already registered"),
        Some(_) => AppError::conflict("Account already exists"),
        None => db_error(context)(err),
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>(&format!("{ACCOUNT_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find account by id"))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>(&format!("{ACCOUNT_SELECT} WHERE a.username = $1"))
            .bind(normalize_username(username))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find account by username"))
    }

    async fn find_by_identity(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<Option<Account>> {
        let username = username.map(normalize_username);
        let email = email.map(normalize_email);
        if username.is_none() && email.is_none() {
            return Ok(None);
        }

        sqlx::query_as::<_, Account>(&format!(
            "{ACCOUNT_SELECT} \
             WHERE ($1::text IS NOT NULL AND a.username = $1) \
                OR ($2::text IS NOT NULL AND a.email = $2) \
             ORDER BY (a.username = $1) IS TRUE DESC, a.created_at ASC \
             LIMIT 1"
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find account by identity"))
    }

    async fn identity_taken(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<AccountId>,
    ) -> AppResult<bool> {
        let username = username.map(normalize_username);
        let email = email.map(normalize_email);
        if username.is_none() && email.is_none() {
            return Ok(false);
        }

        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts \
             WHERE (($1::text IS NOT NULL AND username = $1) \
                 OR ($2::text IS NOT NULL AND email = $2)) \
               AND ($3::uuid IS NULL OR id <> $3))",
        )
        .bind(username)
        .bind(email)
        .bind(except)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check identity availability"))
    }

    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        let id = AccountId::new();
        sqlx::query(
            "INSERT INTO accounts (id, username, email, full_name, avatar, cover_image, \
             password_hash) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(normalize_username(&account.username))
        .bind(normalize_email(&account.email))
        .bind(&account.full_name)
        .bind(&account.avatar)
        .bind(&account.cover_image)
        .bind(&account.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_upstream(e, "Failed to create account"))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::internal("Account vanished after insert"))
    }

    async fn update_fields(
        &self,
        id: AccountId,
        patch: &AccountPatch,
    ) -> AppResult<Option<Account>> {
        let updated = sqlx::query(
            "UPDATE accounts SET \
             full_name = COALESCE($2, full_name), \
             email = COALESCE($3, email), \
             avatar = COALESCE($4, avatar), \
             cover_image = COALESCE($5, cover_image), \
             updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&patch.full_name)
        .bind(patch.email.as_deref().map(normalize_email))
        .bind(&patch.avatar)
        .bind(&patch.cover_image)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_upstream(e, "Failed to update account"))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn update_password(&self, id: AccountId, hash: &PasswordHash) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(hash)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update password"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_refresh_token(&self, id: AccountId, token: Option<&str>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE accounts SET refresh_token = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to store refresh token"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn compare_and_swap_refresh_token(
        &self,
        id: AccountId,
        expected: &str,
        new: Option<&str>,
    ) -> AppResult<bool> {
        // The row lock taken by UPDATE serializes concurrent swaps; the
        // losers re-evaluate the WHERE clause against the winner's value.
        let result = sqlx::query(
            "UPDATE accounts SET refresh_token = $3, updated_at = NOW() \
             WHERE id = $1 AND refresh_token = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(new)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to rotate refresh token"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn record_watch(&self, id: AccountId, media_id: MediaId) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO account_watch_history (account_id, media_id) VALUES ($1, $2)",
        )
        .bind(id)
        .bind(media_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_foreign_key_violation(&e) => Ok(false),
            Err(e) => Err(db_error("Failed to record watch")(e)),
        }
    }
}
