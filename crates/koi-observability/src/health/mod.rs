//! Health checking over circuit breakers and the result cache.

pub mod reporter;

pub use reporter::{HealthReport, HealthReporter, HealthSnapshot, HealthStatus};
