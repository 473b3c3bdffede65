//! Error handling for KOI.
//! One error enum per subsystem, `thiserror` only, aggregated into [`KoiError`].

pub mod backend_error;
pub mod config_error;
pub mod error_code;
pub mod koi_error;
pub mod resilience_error;
pub mod validation_error;

pub use backend_error::{is_retriable_status, is_transient_db_code, BackendError, TransientCause};
pub use config_error::ConfigError;
pub use error_code::KoiErrorCode;
pub use koi_error::{ErrorKind, KoiError, KoiResult};
pub use resilience_error::ResilienceError;
pub use validation_error::ValidationError;
