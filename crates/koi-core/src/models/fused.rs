use std::fmt;

use serde::{Deserialize, Serialize};

use super::Triple;

/// Label of a ranked list taking part in fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Predicate- and entity-filtered graph query.
    Focused,
    /// Entity/keyword-only graph query.
    Broad,
    /// The graph side as a whole, in hybrid fusion.
    Graph,
    Vector,
}

impl Branch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Focused => "focused",
            Self::Broad => "broad",
            Self::Graph => "graph",
            Self::Vector => "vector",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item after reciprocal rank fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fused<T> {
    pub item: T,
    /// Accumulated RRF score (higher = more relevant).
    pub score: f64,
    /// Branches that produced the item, each listed once.
    pub sources: Vec<Branch>,
}

/// A fused graph statement.
pub type FusedRow = Fused<Triple>;

impl FusedRow {
    pub fn subject(&self) -> &str {
        &self.item.subject
    }

    pub fn predicate(&self) -> &str {
        &self.item.predicate
    }

    pub fn object(&self) -> &str {
        &self.item.object
    }
}
