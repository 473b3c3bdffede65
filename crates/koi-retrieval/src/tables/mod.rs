//! Offline-built knowledge tables: predicate consolidation, predicate
//! communities, and the entity lexicon. Read-only after load.

mod loader;

use std::collections::{BTreeMap, HashMap, HashSet};

use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};

/// Predicate variants grouped under one canonical form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalGroup {
    /// Every surface form, canonical first.
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub usage_count: u64,
}

/// Variant → canonical predicate mapping with per-canonical usage counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationMap {
    #[serde(default)]
    pub variant_to_canonical: HashMap<String, String>,
    #[serde(default)]
    pub canonical_groups: BTreeMap<String, CanonicalGroup>,
}

impl ConsolidationMap {
    /// Make every canonical a member of its own group and map every member
    /// back to its canonical.
    fn normalize(&mut self) {
        for (canonical, group) in &mut self.canonical_groups {
            if let Some(pos) = group.members.iter().position(|m| m == canonical) {
                if pos != 0 {
                    let own = group.members.remove(pos);
                    group.members.insert(0, own);
                }
            } else {
                group.members.insert(0, canonical.clone());
            }
            let mut seen = HashSet::new();
            group.members.retain(|m| seen.insert(m.clone()));

            for member in &group.members {
                self.variant_to_canonical
                    .entry(member.clone())
                    .or_insert_with(|| canonical.clone());
            }
        }
    }

    pub fn canonical_of(&self, predicate: &str) -> Option<&str> {
        self.variant_to_canonical.get(predicate).map(String::as_str)
    }

    pub fn usage(&self, canonical: &str) -> u64 {
        self.canonical_groups
            .get(canonical)
            .map(|g| g.usage_count)
            .unwrap_or(0)
    }

    pub fn total_usage(&self) -> u64 {
        self.canonical_groups.values().map(|g| g.usage_count).sum()
    }

    /// Variants of `canonical`, excluding the canonical itself.
    pub fn variants<'a>(&'a self, canonical: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.canonical_groups
            .get(canonical)
            .into_iter()
            .flat_map(|g| g.members.iter())
            .map(String::as_str)
            .filter(move |m| *m != canonical)
    }

    pub fn canonicals(&self) -> impl Iterator<Item = &str> {
        self.canonical_groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.canonical_groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical_groups.is_empty()
    }
}

/// A cluster of co-occurring predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredicateCommunity {
    pub id: u32,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub centrality: HashMap<String, f64>,
}

impl PredicateCommunity {
    pub fn centrality_of(&self, predicate: &str) -> f64 {
        self.centrality.get(predicate).copied().unwrap_or(0.0)
    }

    /// The `n` most central members. Ties break by name.
    pub fn top_members(&self, n: usize) -> Vec<&str> {
        let mut ranked: Vec<&str> = self.members.iter().map(String::as_str).collect();
        ranked.sort_by(|a, b| {
            self.centrality_of(b)
                .total_cmp(&self.centrality_of(a))
                .then_with(|| a.cmp(b))
        });
        ranked.truncate(n);
        ranked
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CommunityFile {
    #[serde(default)]
    communities: Vec<PredicateCommunity>,
}

/// Predicate communities ordered by id. Each predicate belongs to at most
/// one community.
#[derive(Debug, Clone, Default)]
pub struct CommunityIndex {
    communities: Vec<PredicateCommunity>,
    by_predicate: HashMap<String, u32>,
}

impl CommunityIndex {
    pub fn new(mut communities: Vec<PredicateCommunity>) -> Self {
        communities.sort_by_key(|c| c.id);
        let mut by_predicate: HashMap<String, u32> = HashMap::new();
        for community in &mut communities {
            for value in community.centrality.values_mut() {
                if value.is_nan() || *value < 0.0 {
                    *value = 0.0;
                }
            }
            let id = community.id;
            community.members.retain(|member| {
                if let Some(first) = by_predicate.get(member) {
                    tracing::warn!(
                        predicate = %member,
                        kept = first,
                        dropped = id,
                        "predicate listed in more than one community"
                    );
                    return false;
                }
                by_predicate.insert(member.clone(), id);
                true
            });
        }
        Self {
            communities,
            by_predicate,
        }
    }

    pub fn community_of(&self, predicate: &str) -> Option<u32> {
        self.by_predicate.get(predicate).copied()
    }

    pub fn get(&self, id: u32) -> Option<&PredicateCommunity> {
        self.communities
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|i| &self.communities[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredicateCommunity> {
        self.communities.iter()
    }

    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }
}

/// A known named entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub name: String,
    pub entity_type: String,
    /// Owning module, empty when the entity has none.
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Names and aliases this short are too ambiguous to match.
pub const MIN_NAME_CHARS: usize = 4;

/// Compiled-size ceiling for the lexicon's single-pass prefilter.
const PREFILTER_SIZE_LIMIT: usize = 64 << 20;

/// Which surface of a record a pattern matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Name,
    Alias,
}

/// One whole-word, case-insensitive lexicon pattern.
#[derive(Debug, Clone)]
pub struct LexiconPattern {
    /// Index of the owning record.
    pub record: usize,
    pub kind: PatternKind,
    pub regex: Regex,
}

/// Entity lexicon used by the router. Patterns are compiled once at load.
#[derive(Debug, Clone, Default)]
pub struct EntityLexicon {
    entities: Vec<EntityRecord>,
    patterns: Vec<LexiconPattern>,
    prefilter: Option<RegexSet>,
}

impl EntityLexicon {
    pub fn new(entities: Vec<EntityRecord>) -> Self {
        let mut patterns = Vec::new();
        for (index, record) in entities.iter().enumerate() {
            push_pattern(&mut patterns, index, PatternKind::Name, &record.name);
            for alias in &record.aliases {
                push_pattern(&mut patterns, index, PatternKind::Alias, alias);
            }
            if !record.module.is_empty() && record.entity_type.eq_ignore_ascii_case("keeper") {
                let contextual = format!("{} keeper", record.module);
                push_pattern(&mut patterns, index, PatternKind::Alias, &contextual);
            }
        }

        let prefilter = if patterns.is_empty() {
            None
        } else {
            match RegexSetBuilder::new(patterns.iter().map(|p| p.regex.as_str()))
                .case_insensitive(true)
                .size_limit(PREFILTER_SIZE_LIMIT)
                .build()
            {
                Ok(set) => Some(set),
                Err(e) => {
                    tracing::warn!(error = %e, patterns = patterns.len(), "lexicon prefilter unavailable; scanning patterns one by one");
                    None
                }
            }
        };

        Self { entities, patterns, prefilter }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.entities.iter()
    }

    pub fn record(&self, index: usize) -> Option<&EntityRecord> {
        self.entities.get(index)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Patterns that occur somewhere in `text`, in load order.
    pub fn candidates(&self, text: &str) -> Vec<&LexiconPattern> {
        match &self.prefilter {
            Some(set) => set
                .matches(text)
                .into_iter()
                .filter_map(|idx| self.patterns.get(idx))
                .collect(),
            None => self.patterns.iter().filter(|p| p.regex.is_match(text)).collect(),
        }
    }
}

fn push_pattern(patterns: &mut Vec<LexiconPattern>, record: usize, kind: PatternKind, text: &str) {
    if text.chars().count() < MIN_NAME_CHARS {
        return;
    }
    let source = format!(r"\b{}\b", regex::escape(text));
    match RegexBuilder::new(&source).case_insensitive(true).build() {
        Ok(regex) => patterns.push(LexiconPattern { record, kind, regex }),
        Err(e) => tracing::debug!(text, error = %e, "unmatchable lexicon entry"),
    }
}

/// Everything the router and the predicate selector read.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeTables {
    pub consolidation: ConsolidationMap,
    pub communities: CommunityIndex,
    pub entities: EntityLexicon,
}

impl KnowledgeTables {
    pub fn new(
        mut consolidation: ConsolidationMap,
        communities: Vec<PredicateCommunity>,
        entities: Vec<EntityRecord>,
    ) -> Self {
        consolidation.normalize();
        Self {
            consolidation,
            communities: CommunityIndex::new(communities),
            entities: EntityLexicon::new(entities),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether `predicate` is a known canonical or variant.
    pub fn is_known_predicate(&self, predicate: &str) -> bool {
        self.consolidation.canonical_of(predicate).is_some()
    }

    pub fn canonical_of(&self, predicate: &str) -> Option<&str> {
        self.consolidation.canonical_of(predicate)
    }
}
