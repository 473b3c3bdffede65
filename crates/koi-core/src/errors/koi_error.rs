use serde::{Deserialize, Serialize};

use super::{BackendError, ConfigError, ResilienceError, ValidationError};

pub type KoiResult<T> = Result<T, KoiError>;

/// Top-level error type. Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum KoiError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("resilience error: {0}")]
    Resilience(#[from] ResilienceError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// What a caller should do with a failed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Backend unavailable right now: circuit open, transient failure, timeout.
    RetryLater,
    /// The query itself is bad and will never succeed as-is.
    Malformed,
    Unexpected,
}

impl KoiError {
    /// Whether the retry loop may try this call again. Breaker rejections
    /// are never retried.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Backend(e) => e.is_transient(),
            Self::Resilience(ResilienceError::Timeout { .. }) => true,
            _ => false,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Resilience(_) => ErrorKind::RetryLater,
            Self::Backend(e) if e.is_transient() => ErrorKind::RetryLater,
            Self::Validation(_) => ErrorKind::Malformed,
            _ => ErrorKind::Unexpected,
        }
    }

    /// Whether this error counts against a circuit breaker. Only transient
    /// backend failures and timeouts do.
    pub fn counts_as_failure(&self) -> bool {
        self.is_retriable()
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Resilience(ResilienceError::Timeout { .. }))
    }
}
