use serde::{Deserialize, Serialize};

/// One row of a graph query result, keyed by the caller-declared column names.
pub type GraphRow = serde_json::Map<String, serde_json::Value>;

/// Body of a graph backend call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphRequest {
    /// Graph name inside the graph store.
    pub graph: String,
    /// Query text in the backend's native language (Cypher).
    pub query: String,
    /// Column names the rows will carry, in RETURN order.
    pub columns: Vec<String>,
}
