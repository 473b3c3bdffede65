use chrono::{DateTime, Utc};

/// Errors raised by the resilience shell itself, never by a backend.
#[derive(Debug, thiserror::Error)]
pub enum ResilienceError {
    #[error("circuit open for {dependency}, retry after {retry_after}")]
    CircuitOpen {
        dependency: String,
        retry_after: DateTime<Utc>,
    },

    #[error("circuit half-open for {dependency}, trial call budget exhausted")]
    HalfOpenSaturated { dependency: String },

    #[error("{dependency} call timed out after {after_ms}ms")]
    Timeout { dependency: String, after_ms: u64 },
}

impl ResilienceError {
    pub fn dependency(&self) -> &str {
        match self {
            Self::CircuitOpen { dependency, .. }
            | Self::HalfOpenSaturated { dependency }
            | Self::Timeout { dependency, .. } => dependency,
        }
    }
}
