//! # koi-retrieval
//!
//! The adaptive hybrid retrieval engine.
//!
//! ## Architecture
//!
//! ```text
//! HybridEngine
//! ├── QueryRouter
//! │   ├── Entities (lexicon + identifier/proper-noun heuristics)
//! │   └── Intent (keyword tables)
//! ├── DualBranchExecutor
//! │   ├── PredicateSelector (scoring → embedding merge → coverage growth → expansion)
//! │   ├── QueryBuilder (focused / broad GraphQuery → Cypher)
//! │   ├── Mode selection (focused / broad / dual)
//! │   └── RRF fusion + zero-result fallback
//! ├── VectorGateway (vector search + source post-filter)
//! └── Gateways: ResultCache → ResilienceShell → backend
//! ```

pub mod executor;
pub mod gateway;
pub mod hybrid;
pub mod predicates;
pub mod query;
pub mod router;
pub mod search;
pub mod tables;
pub mod text;

pub use executor::{DualBranchExecutor, ExecuteOptions, ExecutionMode, ExecutionResult};
pub use gateway::{Gateway, GraphGateway, SimilarityGateway, VectorGateway};
pub use hybrid::{HybridAnswer, HybridEngine, HybridHit, HybridOptions};
pub use predicates::{PredicateSelection, PredicateSelector, SelectionParams};
pub use query::{GraphQuery, QueryBuilder};
pub use router::QueryRouter;
pub use tables::KnowledgeTables;
