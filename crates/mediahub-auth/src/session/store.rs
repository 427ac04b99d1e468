//! The persisted refresh token, one per account.

use std::sync::Arc;
use std::time::Duration;

use mediahub_core::deadline::bounded;
use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::types::AccountId;
use mediahub_database::AccountStore;

/// Reads and writes `Account.refresh_token` through the account store.
///
/// Every call is bounded by the configured store deadline.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    accounts: Arc<dyn AccountStore>,
    timeout: Duration,
}

impl SessionRecord {
    /// Creates a session record over the given store.
    pub fn new(accounts: Arc<dyn AccountStore>, timeout: Duration) -> Self {
        Self { accounts, timeout }
    }

    /// Overwrites the stored token, silently ending any previous session.
    pub async fn install(&self, account_id: AccountId, token: &str) -> AppResult<()> {
        let stored = bounded(
            "store refresh token",
            self.timeout,
            self.accounts.set_refresh_token(account_id, Some(token)),
        )
        .await?;

        if !stored {
            return Err(AppError::not_found("Account not found"));
        }
        Ok(())
    }

    /// Replaces `presented` with `next` if and only if `presented` is still
    /// the stored token. At most one concurrent caller wins.
    pub async fn rotate(
        &self,
        account_id: AccountId,
        presented: &str,
        next: &str,
    ) -> AppResult<bool> {
        bounded(
            "rotate refresh token",
            self.timeout,
            self.accounts
                .compare_and_swap_refresh_token(account_id, presented, Some(next)),
        )
        .await
    }

    /// Clears the stored token. Clearing an empty record, or one whose
    /// account no longer exists, is a no-op.
    pub async fn clear(&self, account_id: AccountId) -> AppResult<()> {
        bounded(
            "clear refresh token",
            self.timeout,
            self.accounts.set_refresh_token(account_id, None),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediahub_core::error::ErrorKind;
    use mediahub_database::MemoryStore;
    use mediahub_entity::{NewAccount, PasswordHash};

    async fn setup() -> (MemoryStore, SessionRecord, AccountId) {
        let store = MemoryStore::new();
        let account = store
            .create(NewAccount {
                username: "alice".into(),
                email: "alice@example.com".into(),
                full_name: "Alice".into(),
                password_hash: PasswordHash::from_phc("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA"),
                avatar: None,
                cover_image: None,
            })
            .await
            .unwrap();
        let record = SessionRecord::new(Arc::new(store.clone()), Duration::from_secs(1));
        (store, record, account.id)
    }

    #[tokio::test]
    async fn test_install_rotate_clear() {
        let (store, record, id) = setup().await;

        record.install(id, "t1").await.unwrap();
        assert!(record.rotate(id, "t1", "t2").await.unwrap());
        assert!(!record.rotate(id, "t1", "t3").await.unwrap());
        record.clear(id).await.unwrap();
        record.clear(id).await.unwrap();

        let account = store.find_by_id(id).await.unwrap().unwrap();
        assert!(account.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_install_for_missing_account() {
        let (_, record, _) = setup().await;
        let err = record.install(AccountId::new(), "t1").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
