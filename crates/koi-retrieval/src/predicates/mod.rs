//! Adaptive predicate selection: lexical scoring, embedding merge,
//! coverage-driven top-K growth, variant and community expansion.

pub mod coverage;
pub mod expansion;
pub mod scoring;

use std::collections::HashSet;
use std::sync::Arc;

use koi_core::config::RetrievalConfig;
use koi_core::models::ScoredPredicate;
use koi_core::traits::IPredicateSimilarity;
use koi_core::QueryIntent;
use serde::{Deserialize, Serialize};

pub use expansion::ExpansionLimits;

use crate::gateway::SimilarityGateway;
use crate::tables::KnowledgeTables;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionParams {
    pub base_k: usize,
    pub coverage_target: f64,
    pub max_k: usize,
    pub step: usize,
}

impl From<&RetrievalConfig> for SelectionParams {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            base_k: config.base_k,
            coverage_target: config.coverage_target,
            max_k: config.max_k,
            step: config.k_step,
        }
    }
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self::from(&RetrievalConfig::default())
    }
}

/// Selected predicates plus how they were chosen. Predicate order carries
/// no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredicateSelection {
    pub predicates: Vec<String>,
    pub k: usize,
    pub coverage: f64,
    pub embedding_hits: usize,
    pub variant_additions: usize,
    pub community_additions: usize,
}

impl PredicateSelection {
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }
}

#[derive(Debug, Clone)]
pub struct PredicateSelector<S> {
    tables: Arc<KnowledgeTables>,
    similarity: SimilarityGateway<S>,
    limits: ExpansionLimits,
}

impl<S: IPredicateSimilarity> PredicateSelector<S> {
    pub fn new(tables: Arc<KnowledgeTables>, similarity: SimilarityGateway<S>, limits: ExpansionLimits) -> Self {
        Self {
            tables,
            similarity,
            limits,
        }
    }

    /// Select predicates for `query`. The similarity service is optional:
    /// when it fails the lexical ranking alone is used.
    pub async fn select(&self, query: &str, intent: QueryIntent, params: &SelectionParams) -> PredicateSelection {
        let ranking = self.similarity.similar(query, params.max_k).await;
        select_with_ranking(&self.tables, query, intent, params, &self.limits, &ranking)
    }
}

/// Selection given an already-fetched embedding ranking.
pub fn select_with_ranking(
    tables: &KnowledgeTables,
    query: &str,
    intent: QueryIntent,
    params: &SelectionParams,
    limits: &ExpansionLimits,
    ranking: &[ScoredPredicate],
) -> PredicateSelection {
    let scored = scoring::score_predicates(&tables.consolidation, query, intent);

    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates: Vec<String> = Vec::with_capacity(scored.len() + ranking.len());
    let mut embedding_hits = 0;
    for hit in ranking {
        let canonical = tables
            .canonical_of(&hit.predicate)
            .unwrap_or(&hit.predicate)
            .to_string();
        if seen.insert(canonical.clone()) {
            candidates.push(canonical);
            embedding_hits += 1;
        }
    }
    for s in scored {
        if seen.insert(s.predicate.clone()) {
            candidates.push(s.predicate);
        }
    }

    let (k, coverage) = coverage::grow(&candidates, &tables.consolidation, params);
    let expanded = expansion::expand(&candidates[..k], tables, limits);

    tracing::debug!(
        k,
        coverage,
        embedding_hits,
        selected = expanded.predicates.len(),
        "predicates selected"
    );

    PredicateSelection {
        predicates: expanded.predicates,
        k,
        coverage,
        embedding_hits,
        variant_additions: expanded.variant_additions,
        community_additions: expanded.community_additions,
    }
}

#[cfg(test)]
mod tests {
    use koi_cache::ResultCache;
    use koi_core::config::RetryConfig;
    use koi_resilience::ResilienceShell;
    use test_fixtures::MockSimilarity;

    use super::*;
    use crate::gateway::Gateway;

    fn selector(similarity: MockSimilarity) -> PredicateSelector<MockSimilarity> {
        let gateway = Gateway::new(
            ResilienceShell::new(Default::default(), Default::default()).with_retry(RetryConfig::none()),
            Arc::new(ResultCache::default()),
        );
        PredicateSelector::new(
            Arc::new(KnowledgeTables::load(&test_fixtures::tables_config())),
            SimilarityGateway::new(similarity, gateway),
            ExpansionLimits::default(),
        )
    }

    #[tokio::test]
    async fn embedding_order_takes_priority() {
        let params = SelectionParams {
            base_k: 2,
            coverage_target: 0.0,
            max_k: 10,
            step: 2,
        };
        let selection = selector(MockSimilarity::new(&["votesOn", "governed_by"]))
            .select("how do votes work", QueryIntent::Governance, &params)
            .await;
        assert_eq!(selection.k, 2);
        assert_eq!(selection.embedding_hits, 2);
        assert_eq!(&selection.predicates[..2], &["votesOn".to_string(), "governedBy".to_string()]);
    }

    #[tokio::test]
    async fn similarity_outage_still_selects() {
        let selection = selector(MockSimilarity::failing())
            .select("What parameters does MsgSend require?", QueryIntent::Structure, &SelectionParams::default())
            .await;
        assert!(!selection.is_empty());
        assert_eq!(selection.embedding_hits, 0);
        assert!(selection.coverage >= 0.8);
        assert!(selection.predicates.iter().any(|p| p == "hasParameter"));
        assert!(selection.predicates.iter().any(|p| p == "takesParam"));
    }

    #[test]
    fn empty_vocabulary_selects_nothing() {
        let selection = select_with_ranking(
            &KnowledgeTables::empty(),
            "anything",
            QueryIntent::General,
            &SelectionParams::default(),
            &ExpansionLimits::default(),
            &[],
        );
        assert!(selection.is_empty());
    }
}
