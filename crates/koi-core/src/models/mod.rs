pub mod classification;
pub mod fused;
pub mod graph;
pub mod health;
pub mod predicate;
pub mod triple;
pub mod vector;

pub use classification::{Classification, DetectedEntity, Route};
pub use fused::{Branch, Fused, FusedRow};
pub use graph::{GraphRequest, GraphRow};
pub use health::{BreakerSnapshot, CacheStats, CircuitState};
pub use predicate::ScoredPredicate;
pub use triple::{Triple, TripleKey};
pub use vector::{DateRange, VectorFilters, VectorHealth, VectorMemory, VectorQuery, VectorStats};
