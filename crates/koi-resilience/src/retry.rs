//! Retry with exponential backoff.

use std::future::Future;

use koi_core::config::RetryConfig;
use koi_core::KoiResult;
use koi_observability::events;

/// Run `op` until it succeeds, fails with a non-retriable error, or
/// `max_retries` retries have been spent. Waits
/// [`RetryConfig::delay_for`] between attempts.
pub async fn retry_with_backoff<T, F, Fut>(
    dependency: &str,
    config: &RetryConfig,
    mut op: F,
) -> KoiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = KoiResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retriable() && attempt < config.max_retries => {
                let delay = config.delay_for(attempt);
                attempt += 1;
                events::retry_scheduled(dependency, attempt, delay, &e.to_string());
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
