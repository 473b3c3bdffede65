//! # koi-core
//!
//! Foundation crate for the KOI hybrid retrieval engine.
//! Defines the statement model, intent taxonomy, backend traits, errors,
//! config, and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod intent;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::KoiConfig;
pub use errors::{ErrorKind, KoiError, KoiResult};
pub use intent::QueryIntent;
pub use models::{Branch, Classification, Fused, FusedRow, Route, Triple};
