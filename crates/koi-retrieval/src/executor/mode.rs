use std::fmt;

use serde::{Deserialize, Serialize};

use crate::router::{has_exploration_word, has_relational_verb};
use crate::text::tokenize;

/// Which graph branches to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Decide from the query.
    #[default]
    Auto,
    Focused,
    Broad,
    Dual,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Focused => "focused",
            Self::Broad => "broad",
            Self::Dual => "dual",
        }
    }

    /// Resolve `Auto` against the query; explicit modes are kept.
    pub fn resolve(self, query: &str, has_entity: bool) -> Self {
        if self != Self::Auto {
            return self;
        }
        let tokens = tokenize(query);
        if has_entity && has_exploration_word(&tokens) {
            Self::Dual
        } else if has_entity && has_relational_verb(&tokens) {
            Self::Focused
        } else {
            Self::Broad
        }
    }

    pub fn runs_focused(&self) -> bool {
        matches!(self, Self::Focused | Self::Dual)
    }

    pub fn runs_broad(&self) -> bool {
        matches!(self, Self::Broad | Self::Dual)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
