use std::future::Future;
use std::time::Duration;

use koi_core::errors::ResilienceError;
use koi_core::KoiResult;

/// Bound `fut` by `after`. On expiry the future is dropped and a
/// [`ResilienceError::Timeout`] is returned.
pub async fn with_timeout<T, Fut>(dependency: &str, after: Duration, fut: Fut) -> KoiResult<T>
where
    Fut: Future<Output = KoiResult<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(ResilienceError::Timeout {
            dependency: dependency.to_string(),
            after_ms: after.as_millis() as u64,
        }
        .into()),
    }
}
