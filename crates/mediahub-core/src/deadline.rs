//! Bounded I/O for calls into the store and other collaborators.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::AppError;
use crate::result::AppResult;

/// Runs `fut` with an upper bound of `limit`.
///
/// An elapsed deadline surfaces as an upstream failure naming `operation`;
/// the caller decides whether to retry.
pub async fn bounded<T, F>(operation: &str, limit: Duration, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = limit.as_millis() as u64, "Operation timed out");
            Err(AppError::upstream(format!(
                "{operation} did not complete within {}ms",
                limit.as_millis()
            )))
        }
    }
}
