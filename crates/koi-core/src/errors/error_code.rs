//! Stable error codes for callers that only see strings (tool transports, logs).

use super::{BackendError, ConfigError, KoiError, ResilienceError, ValidationError};

pub const BACKEND_TRANSIENT: &str = "BACKEND_TRANSIENT";
pub const BACKEND_PERMANENT: &str = "BACKEND_PERMANENT";
pub const CIRCUIT_OPEN: &str = "CIRCUIT_OPEN";
pub const HALF_OPEN_SATURATED: &str = "HALF_OPEN_SATURATED";
pub const TIMEOUT: &str = "TIMEOUT";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
pub const UNEXPECTED: &str = "UNEXPECTED";

/// Implemented by every KOI error enum.
pub trait KoiErrorCode {
    fn error_code(&self) -> &'static str;
}

impl KoiErrorCode for BackendError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transient { .. } => BACKEND_TRANSIENT,
            Self::Permanent { .. } => BACKEND_PERMANENT,
        }
    }
}

impl KoiErrorCode for ResilienceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CircuitOpen { .. } => CIRCUIT_OPEN,
            Self::HalfOpenSaturated { .. } => HALF_OPEN_SATURATED,
            Self::Timeout { .. } => TIMEOUT,
        }
    }
}

impl KoiErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        VALIDATION_ERROR
    }
}

impl KoiErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        CONFIG_ERROR
    }
}

impl KoiErrorCode for KoiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Backend(e) => e.error_code(),
            Self::Resilience(e) => e.error_code(),
            Self::Validation(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Serialization(_) => SERIALIZATION_ERROR,
            Self::Unexpected(_) => UNEXPECTED,
        }
    }
}
