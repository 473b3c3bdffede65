use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants;

/// Exponential backoff policy: `delay = min(initial * multiplier^attempt, max)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt (3 → 4 attempts total).
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            initial_delay_ms: defaults::DEFAULT_INITIAL_DELAY_MS,
            multiplier: defaults::DEFAULT_BACKOFF_MULTIPLIER,
            max_delay_ms: defaults::DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl RetryConfig {
    /// No retries at all: a single attempt.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt.min(64) as i32);
        let raw = self.initial_delay_ms as f64 * factor;
        let capped = raw.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Circuit breaker thresholds for one dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures (net of decrements) that open the circuit.
    pub failure_threshold: u32,
    /// Time after the last failure before an open circuit admits trial calls.
    pub reset_timeout_ms: u64,
    /// Concurrent trial calls admitted while half-open.
    pub half_open_max_calls: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: defaults::DEFAULT_FAILURE_THRESHOLD,
            reset_timeout_ms: defaults::DEFAULT_RESET_TIMEOUT_MS,
            half_open_max_calls: defaults::DEFAULT_HALF_OPEN_MAX_CALLS,
        }
    }
}

impl BreakerConfig {
    pub fn database() -> Self {
        Self {
            failure_threshold: defaults::DATABASE_FAILURE_THRESHOLD,
            reset_timeout_ms: defaults::DATABASE_RESET_TIMEOUT_MS,
            ..Self::default()
        }
    }

    pub fn reset_timeout(&self) -> Duration {
        Duration::from_millis(self.reset_timeout_ms)
    }
}

/// Retry policy plus one breaker config per known dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    /// Used for any dependency without its own entry.
    pub default_breaker: BreakerConfig,
    pub graph_breaker: BreakerConfig,
    pub vector_breaker: BreakerConfig,
    pub similarity_breaker: BreakerConfig,
    pub database_breaker: BreakerConfig,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            default_breaker: BreakerConfig::default(),
            graph_breaker: BreakerConfig::default(),
            vector_breaker: BreakerConfig::default(),
            similarity_breaker: BreakerConfig::default(),
            database_breaker: BreakerConfig::database(),
        }
    }
}

impl ResilienceConfig {
    pub fn breaker_for(&self, dependency: &str) -> &BreakerConfig {
        match dependency {
            constants::GRAPH_API => &self.graph_breaker,
            constants::VECTOR_API => &self.vector_breaker,
            constants::SIMILARITY_API => &self.similarity_breaker,
            constants::DATABASE => &self.database_breaker,
            _ => &self.default_breaker,
        }
    }
}
