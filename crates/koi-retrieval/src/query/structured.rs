use koi_core::constants::{MAX_QUERY_LIMIT, STATEMENT_COLUMNS};
use koi_core::models::{Branch, GraphRequest};
use serde::{Deserialize, Serialize};

use super::keywords::{detect_categories, CanonicalCategory, NOISE_TERMS};
use crate::router::QueryRouter;
use crate::text::keyword_tokens;

/// A graph query before serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQuery {
    /// `Focused` or `Broad`.
    pub branch: Branch,
    /// Predicate filter; empty for broad queries.
    pub predicates: Vec<String>,
    pub entity_terms: Vec<String>,
    pub keyword_terms: Vec<String>,
    /// Also match keywords against the relation type.
    pub match_predicate_text: bool,
    pub categories: Vec<CanonicalCategory>,
    pub negative_terms: Vec<String>,
    /// In `1..=MAX_QUERY_LIMIT`.
    pub limit: usize,
}

impl GraphQuery {
    pub fn columns() -> Vec<String> {
        STATEMENT_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    pub fn to_request(&self, graph: &str) -> GraphRequest {
        GraphRequest {
            graph: graph.to_string(),
            query: self.to_cypher(),
            columns: Self::columns(),
        }
    }

    pub fn has_category_filter(&self) -> bool {
        !self.categories.is_empty()
    }
}

/// Builds focused and broad queries from free text.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    router: QueryRouter,
}

impl QueryBuilder {
    pub fn new(router: QueryRouter) -> Self {
        Self { router }
    }

    /// Predicate-filtered query over entity and keyword matches.
    pub fn build_focused(
        &self,
        query: &str,
        predicates: &[String],
        limit: usize,
        apply_canonical_filter: bool,
    ) -> GraphQuery {
        let terms = self.terms(query);
        GraphQuery {
            branch: Branch::Focused,
            predicates: predicates.to_vec(),
            entity_terms: terms.entities,
            keyword_terms: terms.keywords,
            match_predicate_text: false,
            categories: categories_for(query, apply_canonical_filter),
            negative_terms: noise_terms(),
            limit: clamp_limit(limit),
        }
    }

    /// Entity/keyword query without a predicate filter. With no entity in
    /// the query, keywords also match the relation type.
    pub fn build_broad(&self, query: &str, limit: usize, apply_canonical_filter: bool) -> GraphQuery {
        let terms = self.terms(query);
        GraphQuery {
            branch: Branch::Broad,
            predicates: Vec::new(),
            match_predicate_text: terms.entities.is_empty(),
            entity_terms: terms.entities,
            keyword_terms: terms.keywords,
            categories: categories_for(query, apply_canonical_filter),
            negative_terms: noise_terms(),
            limit: clamp_limit(limit),
        }
    }

    fn terms(&self, query: &str) -> Terms {
        let mut found = self.router.entities(query);
        // Stable: equal confidences keep query order.
        found.sort_by(|a, b| b.entity.confidence.total_cmp(&a.entity.confidence));

        let mut entities: Vec<String> = Vec::new();
        for m in found {
            let name = m.entity.name;
            if !entities.iter().any(|e| e.eq_ignore_ascii_case(&name)) {
                entities.push(name);
            }
        }

        let covered: Vec<String> = entities.iter().map(|e| e.to_lowercase()).collect();
        let keywords = keyword_tokens(query)
            .into_iter()
            .filter(|t| !covered.iter().any(|e| e.contains(t.as_str())))
            .collect();

        Terms { entities, keywords }
    }
}

struct Terms {
    entities: Vec<String>,
    keywords: Vec<String>,
}

fn categories_for(query: &str, apply: bool) -> Vec<CanonicalCategory> {
    if apply {
        detect_categories(query)
    } else {
        Vec::new()
    }
}

fn noise_terms() -> Vec<String> {
    NOISE_TERMS.iter().map(|t| t.to_string()).collect()
}

fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_QUERY_LIMIT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tables::KnowledgeTables;

    fn builder() -> QueryBuilder {
        let tables = KnowledgeTables::load(&test_fixtures::tables_config());
        QueryBuilder::new(QueryRouter::new(Arc::new(tables)))
    }

    #[test]
    fn focused_query_shape() {
        let q = builder().build_focused(
            "What parameters does MsgSend require?",
            &["hasField".into(), "requires".into()],
            50,
            true,
        );
        assert_eq!(q.entity_terms, vec!["MsgSend"]);
        assert_eq!(q.keyword_terms, vec!["parameters", "require"]);
        let text = q.to_cypher();
        assert!(text.starts_with("MATCH (s)-[r]->(o)\nWHERE type(r) IN ['hasField', 'requires']"));
        assert!(text.contains("s.name =~ '(?i).*MsgSend.*'"));
        assert!(text.contains("toLower(o.name) CONTAINS 'parameters'"));
        assert!(!text.contains("toLower(type(r))"));
        assert!(text.contains("NOT (toLower(s.name) CONTAINS 'webpack'"));
        assert!(text.ends_with("\nLIMIT 50"));
    }

    #[test]
    fn entity_matches_precede_keyword_matches() {
        let text = builder()
            .build_focused("MsgSend parameters", &["hasField".into()], 10, false)
            .to_cypher();
        let entity = text.find("=~").unwrap_or(usize::MAX);
        let keyword = text.find("CONTAINS 'parameters'").unwrap_or(0);
        assert!(entity < keyword);
    }

    #[test]
    fn broad_without_entities_matches_relation_type() {
        let q = builder().build_broad("ecocredit governance", 20, true);
        assert!(q.match_predicate_text);
        assert!(q.entity_terms.is_empty());
        assert_eq!(
            q.categories,
            vec![CanonicalCategory::Governance, CanonicalCategory::EcoCredit]
        );
        let text = q.to_cypher();
        assert!(!text.contains("type(r) IN"));
        assert!(text.contains("toLower(type(r)) CONTAINS 'ecocredit'"));
        assert!(text.contains("r.canonical_category IN ['governance', 'eco_credit']"));
    }

    #[test]
    fn fallback_shape_drops_categories_keeps_noise_filter() {
        let q = builder().build_broad("ecocredit governance", 20, false);
        assert!(q.categories.is_empty());
        let text = q.to_cypher();
        assert!(!text.contains("canonical_category"));
        assert!(text.contains("'i18next'"));
    }

    #[test]
    fn limit_is_clamped() {
        let b = builder();
        assert_eq!(b.build_broad("x", 0, false).limit, 1);
        assert_eq!(b.build_broad("x", 10_000, false).limit, MAX_QUERY_LIMIT);
        assert!(b.build_broad("x", 0, false).to_cypher().contains("LIMIT 1"));
    }

    #[test]
    fn hostile_terms_stay_inside_literals() {
        let mut q = builder().build_broad("x", 5, false);
        q.entity_terms = vec!["O'Brien') DETACH DELETE n //".into()];
        q.keyword_terms = vec!["it's".into()];
        let text = q.to_cypher();
        assert!(text.contains("O\\'Brien"));
        assert!(!text.contains("O'Brien"));
        assert!(text.contains("CONTAINS 'it\\'s'"));
    }
}
