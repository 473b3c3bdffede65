use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants;

/// Endpoints and call deadlines for the external backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Graph query endpoint (receives `{graph, query, columns}`).
    pub graph_url: String,
    /// Name of the graph inside the graph store.
    pub graph_name: String,
    /// Base URL of the vector/keyword search API (`/query` and `/health` are appended).
    pub vector_url: String,
    /// Base URL of the predicate embedding-similarity service. `None` disables it.
    pub similarity_url: Option<String>,
    pub graph_timeout_ms: u64,
    pub vector_timeout_ms: u64,
    pub similarity_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            graph_url: defaults::DEFAULT_GRAPH_URL.to_string(),
            graph_name: defaults::DEFAULT_GRAPH_NAME.to_string(),
            vector_url: defaults::DEFAULT_VECTOR_URL.to_string(),
            similarity_url: None,
            graph_timeout_ms: defaults::DEFAULT_GRAPH_TIMEOUT_MS,
            vector_timeout_ms: defaults::DEFAULT_VECTOR_TIMEOUT_MS,
            similarity_timeout_ms: defaults::DEFAULT_SIMILARITY_TIMEOUT_MS,
        }
    }
}

impl BackendConfig {
    /// Per-call deadline for a named dependency. Unknown names get the graph deadline.
    pub fn timeout_for(&self, dependency: &str) -> Duration {
        let ms = match dependency {
            constants::VECTOR_API => self.vector_timeout_ms,
            constants::SIMILARITY_API => self.similarity_timeout_ms,
            _ => self.graph_timeout_ms,
        };
        Duration::from_millis(ms)
    }
}
