//! # koi-observability
//!
//! Structured tracing setup, one function per log event, and health
//! reporting derived from breaker snapshots and cache counters.

pub mod health;
pub mod tracing_setup;

pub use health::{HealthReport, HealthReporter, HealthSnapshot, HealthStatus};
pub use tracing_setup::events;
