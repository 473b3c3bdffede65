use std::fmt;

use serde::{Deserialize, Serialize};

/// Relation family a question is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    Employment,
    Creation,
    Leadership,
    Funding,
    Aggregation,
    Membership,
    Location,
    Governance,
    Structure,
    General,
}

impl QueryIntent {
    pub const COUNT: usize = 10;

    /// Keyword-detectable intents in tie-break order, followed by `General`.
    pub const ALL: [QueryIntent; Self::COUNT] = [
        Self::Employment,
        Self::Creation,
        Self::Leadership,
        Self::Funding,
        Self::Aggregation,
        Self::Membership,
        Self::Location,
        Self::Governance,
        Self::Structure,
        Self::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employment => "employment",
            Self::Creation => "creation",
            Self::Leadership => "leadership",
            Self::Funding => "funding",
            Self::Aggregation => "aggregation",
            Self::Membership => "membership",
            Self::Location => "location",
            Self::Governance => "governance",
            Self::Structure => "structure",
            Self::General => "general",
        }
    }

    /// Lowercase fragments that mark a predicate as belonging to this intent.
    /// Matched as substrings against the camelCase-split predicate text.
    pub fn predicate_terms(&self) -> &'static [&'static str] {
        match self {
            Self::Employment => &["work", "employ", "hire", "staff", "job"],
            Self::Creation => &["creat", "built", "build", "found", "develop", "author"],
            Self::Leadership => &["lead", "head", "ceo", "direct", "maintain", "manag"],
            Self::Funding => &["fund", "grant", "invest", "donat", "sponsor"],
            Self::Aggregation => &["count", "total", "has", "include"],
            Self::Membership => &["member", "part", "belong", "join"],
            Self::Location => &["locat", "based", "region", "countr", "place"],
            Self::Governance => &["govern", "propos", "vote", "param", "author"],
            Self::Structure => &[
                "field", "param", "call", "handl", "requir", "contain", "defin", "emit",
                "implement", "use", "has",
            ],
            Self::General => &[],
        }
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
