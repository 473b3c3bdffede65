use std::fmt;
use std::time::Duration;

use koi_core::config::CacheConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    Static,
    SemiStatic,
    Dynamic,
    /// Never cached.
    Volatile,
}

impl CacheCategory {
    pub const CACHED: [CacheCategory; 3] = [Self::Static, Self::SemiStatic, Self::Dynamic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::SemiStatic => "semi_static",
            Self::Dynamic => "dynamic",
            Self::Volatile => "volatile",
        }
    }

    /// `(ttl, capacity)` for a cached category, `None` for volatile.
    pub fn limits(&self, config: &CacheConfig) -> Option<(Duration, u64)> {
        match self {
            Self::Static => Some((
                Duration::from_secs(config.static_ttl_secs),
                config.static_capacity,
            )),
            Self::SemiStatic => Some((
                Duration::from_secs(config.semi_static_ttl_secs),
                config.semi_static_capacity,
            )),
            Self::Dynamic => Some((
                Duration::from_secs(config.dynamic_ttl_secs),
                config.dynamic_capacity,
            )),
            Self::Volatile => None,
        }
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of backend query being cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    PredicateSimilarity,
    GraphFocused,
    GraphBroad,
    VectorSearch,
    HybridSearch,
    Health,
    Stats,
}

impl QueryType {
    pub const ALL: [QueryType; 7] = [
        Self::PredicateSimilarity,
        Self::GraphFocused,
        Self::GraphBroad,
        Self::VectorSearch,
        Self::HybridSearch,
        Self::Health,
        Self::Stats,
    ];

    pub fn category(&self) -> CacheCategory {
        match self {
            Self::PredicateSimilarity => CacheCategory::Static,
            Self::GraphFocused | Self::GraphBroad => CacheCategory::SemiStatic,
            Self::VectorSearch | Self::HybridSearch => CacheCategory::Dynamic,
            Self::Health | Self::Stats => CacheCategory::Volatile,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PredicateSimilarity => "predicate_similarity",
            Self::GraphFocused => "graph_focused",
            Self::GraphBroad => "graph_broad",
            Self::VectorSearch => "vector_search",
            Self::HybridSearch => "hybrid_search",
            Self::Health => "health",
            Self::Stats => "stats",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
