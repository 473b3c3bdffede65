//! `retry(breaker(timeout(op)))` for every external call.

use std::future::Future;
use std::sync::Arc;

use koi_core::config::{BackendConfig, KoiConfig, ResilienceConfig, RetryConfig};
use koi_core::KoiResult;

use crate::registry::BreakerRegistry;
use crate::retry::retry_with_backoff;
use crate::timeout::with_timeout;

/// Resilience wrapper shared by all backend gateways.
#[derive(Debug, Clone)]
pub struct ResilienceShell {
    registry: Arc<BreakerRegistry>,
    retry: RetryConfig,
    backends: BackendConfig,
}

impl ResilienceShell {
    pub fn new(resilience: ResilienceConfig, backends: BackendConfig) -> Self {
        let retry = resilience.retry.clone();
        Self {
            registry: Arc::new(BreakerRegistry::new(resilience)),
            retry,
            backends,
        }
    }

    pub fn from_config(config: &KoiConfig) -> Self {
        Self::new(config.resilience.clone(), config.backends.clone())
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn registry(&self) -> &Arc<BreakerRegistry> {
        &self.registry
    }

    /// Call `op` for `dependency`. Each attempt is bounded by the
    /// dependency's timeout and admitted by its breaker; retriable
    /// failures are retried with backoff.
    pub async fn call<T, F, Fut>(&self, dependency: &str, mut op: F) -> KoiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = KoiResult<T>>,
    {
        let breaker = self.registry.get(dependency);
        let after = self.backends.timeout_for(dependency);
        let breaker = &breaker;

        retry_with_backoff(dependency, &self.retry, || {
            let attempt = op();
            async move { breaker.call(with_timeout(dependency, after, attempt)).await }
        })
        .await
    }
}
