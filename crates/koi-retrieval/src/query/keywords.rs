//! Domain keyword tables for the canonical-category and noise filters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text::contains_phrase;

/// Ledger-domain category recorded on graph edges as `r.canonical_category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalCategory {
    Finance,
    Governance,
    EcoCredit,
    Marketplace,
    Data,
    Identity,
}

impl CanonicalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finance => "finance",
            Self::Governance => "governance",
            Self::EcoCredit => "eco_credit",
            Self::Marketplace => "marketplace",
            Self::Data => "data",
            Self::Identity => "identity",
        }
    }
}

impl fmt::Display for CanonicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger phrases per category. Phrases with uppercase letters only match
/// that exact casing.
const CATEGORY_KEYWORDS: &[(CanonicalCategory, &[&str])] = &[
    (
        CanonicalCategory::Finance,
        &[
            "fee", "fees", "token", "tokens", "price", "pricing", "payment", "payments", "fund",
            "funds", "treasury", "denom", "balance", "supply", "community pool",
        ],
    ),
    (
        CanonicalCategory::Governance,
        &["governance", "proposal", "proposals", "vote", "votes", "voting", "gov", "group policy"],
    ),
    (
        CanonicalCategory::EcoCredit,
        &[
            "ecocredit", "eco-credit", "credit", "credits", "credit class", "batch", "batches",
            "retire", "retirement", "retired",
        ],
    ),
    (
        CanonicalCategory::Marketplace,
        &["marketplace", "sell order", "buy order", "auction", "listing"],
    ),
    (
        CanonicalCategory::Data,
        &["anchor", "anchored", "attest", "attestation", "attestor", "resolver", "content hash"],
    ),
    (
        CanonicalCategory::Identity,
        &["DID", "did:regen", "identity", "identities", "decentralized identifier"],
    ),
];

/// Build tooling and i18n libraries that pollute code-derived graphs.
pub const NOISE_TERMS: &[&str] = &[
    "webpack", "eslint", "babel", "prettier", "rollup", "postcss", "polyfill", "node_modules",
    "i18next", "intl", "i18n", "formatjs", "lingui",
];

/// Categories whose trigger phrases occur in the query, in table order.
pub fn detect_categories(query: &str) -> Vec<CanonicalCategory> {
    let lower = crate::text::tokenize(query);
    let exact: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    CATEGORY_KEYWORDS
        .iter()
        .filter(|(_, phrases)| {
            phrases.iter().any(|p| {
                if p.chars().any(char::is_uppercase) {
                    contains_phrase_exact(&exact, p)
                } else {
                    contains_phrase(&lower, p)
                }
            })
        })
        .map(|(category, _)| *category)
        .collect()
}

fn contains_phrase_exact(tokens: &[String], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    !needle.is_empty()
        && tokens
            .windows(needle.len())
            .any(|w| w.iter().map(String::as_str).eq(needle.iter().copied()))
}
