//! Intent classification by keyword matching.

use koi_core::QueryIntent;

use crate::text::contains_phrase;

/// Keyword phrases per intent, in tie-break order.
const INTENT_KEYWORDS: &[(QueryIntent, &[&str])] = &[
    (
        QueryIntent::Employment,
        &["works at", "work at", "working at", "employed", "employee", "employees", "hired", "staff", "works for"],
    ),
    (
        QueryIntent::Creation,
        &["created", "creator", "built", "founded", "founder", "developed", "authored", "wrote"],
    ),
    (
        QueryIntent::Leadership,
        &["leads", "lead", "led", "ceo", "cto", "head of", "maintainer", "maintains", "director"],
    ),
    (
        QueryIntent::Funding,
        &["funded", "funding", "grant", "grants", "invested", "investor", "sponsored", "donated"],
    ),
    (
        QueryIntent::Aggregation,
        &["how many", "count", "list all", "total", "number of"],
    ),
    (
        QueryIntent::Membership,
        &["member of", "members", "part of", "belongs", "belong to", "joined"],
    ),
    (
        QueryIntent::Location,
        &["where", "located", "based in", "headquartered", "location"],
    ),
    (
        QueryIntent::Governance,
        &["proposal", "proposals", "vote", "votes", "voting", "governance", "gov"],
    ),
    (
        QueryIntent::Structure,
        &[
            "field", "fields", "parameter", "parameters", "param", "params", "require",
            "requires", "contains", "calls", "handles", "defines", "emits", "implements",
        ],
    ),
];

/// Intent with the most keyword hits and that hit count. Ties go to the
/// earlier intent; no hits is `General` with zero hits.
pub fn classify_intent(tokens: &[String]) -> (QueryIntent, usize) {
    let mut best = (QueryIntent::General, 0usize);
    for (intent, keywords) in INTENT_KEYWORDS {
        let hits = keywords
            .iter()
            .filter(|kw| contains_phrase(tokens, kw))
            .count();
        if hits > best.1 {
            best = (*intent, hits);
        }
    }
    best
}
