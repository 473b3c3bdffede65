//! Variant and community expansion of a predicate selection.

use std::collections::{BTreeSet, HashSet};

use koi_core::config::RetrievalConfig;

use crate::tables::KnowledgeTables;

/// Bounds on how far a selection may be widened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimits {
    pub max_variants_per_canonical: usize,
    pub community_top_n: usize,
    pub max_community_additions: usize,
}

impl From<&RetrievalConfig> for ExpansionLimits {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            max_variants_per_canonical: config.max_variants_per_canonical,
            community_top_n: config.community_top_n,
            max_community_additions: config.max_community_additions,
        }
    }
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self::from(&RetrievalConfig::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub predicates: Vec<String>,
    pub variant_additions: usize,
    pub community_additions: usize,
}

/// Add consolidation variants of each selected canonical, then the most
/// central members of every community the selection touches.
pub fn expand(selected: &[String], tables: &KnowledgeTables, limits: &ExpansionLimits) -> Expansion {
    let mut seen: HashSet<String> = HashSet::new();
    let mut predicates: Vec<String> = Vec::new();
    for predicate in selected {
        if seen.insert(predicate.clone()) {
            predicates.push(predicate.clone());
        }
    }

    let mut variant_additions = 0;
    for canonical in selected {
        let variants = tables
            .consolidation
            .variants(canonical)
            .take(limits.max_variants_per_canonical);
        for variant in variants {
            if seen.insert(variant.to_string()) {
                predicates.push(variant.to_string());
                variant_additions += 1;
            }
        }
    }

    let touched: BTreeSet<u32> = predicates
        .iter()
        .filter_map(|p| tables.communities.community_of(p))
        .collect();

    let mut community_additions = 0;
    'communities: for id in touched {
        let Some(community) = tables.communities.get(id) else {
            continue;
        };
        for member in community.top_members(limits.community_top_n) {
            if community_additions >= limits.max_community_additions {
                break 'communities;
            }
            if seen.insert(member.to_string()) {
                predicates.push(member.to_string());
                community_additions += 1;
            }
        }
    }

    Expansion {
        predicates,
        variant_additions,
        community_additions,
    }
}
