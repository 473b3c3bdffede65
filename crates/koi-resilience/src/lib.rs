//! # koi-resilience
//!
//! Makes repeated calls to unreliable backends safe: every call goes through
//! `retry(breaker(timeout(op)))` via [`ResilienceShell`].

pub mod circuit_breaker;
pub mod registry;
pub mod retry;
pub mod shell;
pub mod timeout;

pub use circuit_breaker::{CallPermit, CircuitBreaker};
pub use registry::BreakerRegistry;
pub use retry::retry_with_backoff;
pub use shell::ResilienceShell;
pub use timeout::with_timeout;
