use std::fmt;

use serde::{Deserialize, Serialize};

use crate::intent::QueryIntent;

/// Primary backend recommended for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Graph,
    Vector,
    Unified,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Vector => "vector",
            Self::Unified => "unified",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity mention found in a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedEntity {
    /// Canonical name for lexicon matches, surface text for heuristic spans.
    pub name: String,
    /// Lexicon type ("Msg", "Keeper", ...) or `identifier` / `proper_noun`.
    pub entity_type: String,
    pub confidence: f64,
}

/// Router output for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: QueryIntent,
    pub detected_entities: Vec<DetectedEntity>,
    /// In `[0, 1]`, deterministic for a given query and lexicon.
    pub confidence: f64,
    pub recommended_route: Route,
}
