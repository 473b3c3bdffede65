//! Structured graph queries and their Cypher serialization.

pub mod cypher;
pub mod keywords;
mod structured;

pub use keywords::{detect_categories, CanonicalCategory, NOISE_TERMS};
pub use structured::{GraphQuery, QueryBuilder};
