use serde::{Deserialize, Serialize};

/// A predicate scored against one query. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPredicate {
    pub predicate: String,
    pub score: f64,
    /// Historical usage count.
    #[serde(default)]
    pub count: u64,
}
