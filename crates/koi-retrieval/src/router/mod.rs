//! Query classification: entities, intent, recommended route, confidence.

pub mod entities;
pub mod intent;

use std::sync::Arc;

use koi_core::models::{Classification, Route};
use koi_core::QueryIntent;
use koi_observability::events;

pub use entities::EntityMatch;
pub use intent::classify_intent;

use crate::tables::KnowledgeTables;
use crate::text::{contains_phrase, tokenize};

/// Verbs that name an explicit graph relation.
pub const RELATIONAL_VERBS: &[&str] = &[
    "calls", "call", "handles", "handle", "requires", "require", "contains", "contain",
    "uses", "use", "emits", "emit", "defines", "define", "implements", "implement",
    "invokes", "depends on", "governed by", "funded by", "created by", "works at",
    "member of", "belongs to", "leads",
];

/// Phrases that mark a conceptual or descriptive question.
pub const CONCEPTUAL_MARKERS: &[&str] = &[
    "what is", "what are", "explain", "how does", "how do", "why", "overview", "describe",
    "tell me about", "meaning of",
];

/// Words asking for everything known about a subject.
pub const EXPLORATION_WORDS: &[&str] = &["all", "show", "list", "about", "everything"];

/// Entity strength at which a relational query goes straight to the graph.
const GRAPH_ROUTE_MIN_ENTITY_CONFIDENCE: f64 = 0.8;

pub fn has_relational_verb(tokens: &[String]) -> bool {
    RELATIONAL_VERBS.iter().any(|v| contains_phrase(tokens, v))
}

pub fn is_conceptual(tokens: &[String]) -> bool {
    CONCEPTUAL_MARKERS.iter().any(|m| contains_phrase(tokens, m))
}

pub fn has_exploration_word(tokens: &[String]) -> bool {
    EXPLORATION_WORDS.iter().any(|w| contains_phrase(tokens, w))
}

/// `clamp(0.2 + 0.5 * entity_strength + 0.3 * min(hits, 2) / 2)`.
pub fn route_confidence(entity_strength: f64, intent_hits: usize) -> f64 {
    let intent_strength = intent_hits.min(2) as f64 / 2.0;
    (0.2 + 0.5 * entity_strength + 0.3 * intent_strength).clamp(0.0, 1.0)
}

/// Stateless classifier over the loaded entity lexicon. Never fails.
#[derive(Debug, Clone)]
pub struct QueryRouter {
    tables: Arc<KnowledgeTables>,
}

impl QueryRouter {
    pub fn new(tables: Arc<KnowledgeTables>) -> Self {
        Self { tables }
    }

    pub fn classify(&self, query: &str) -> Classification {
        let tokens = tokenize(query);
        let found = self.entities(query);
        let (intent, hits) = classify_intent(&tokens);

        let entity_strength = found
            .iter()
            .map(|m| m.entity.confidence)
            .fold(0.0_f64, f64::max);
        let recommended_route = if entity_strength >= GRAPH_ROUTE_MIN_ENTITY_CONFIDENCE
            && has_relational_verb(&tokens)
        {
            Route::Graph
        } else if found.is_empty() && is_conceptual(&tokens) {
            Route::Vector
        } else {
            Route::Unified
        };
        let confidence = route_confidence(entity_strength, hits);

        events::route_selected(recommended_route.as_str(), intent.as_str(), confidence, found.len());
        Classification {
            intent,
            detected_entities: found.into_iter().map(|m| m.entity).collect(),
            confidence,
            recommended_route,
        }
    }

    /// Entity mentions with their spans.
    pub fn entities(&self, query: &str) -> Vec<EntityMatch> {
        entities::detect(query, &self.tables.entities)
    }

    pub fn intent(&self, query: &str) -> QueryIntent {
        classify_intent(&tokenize(query)).0
    }

    pub fn tables(&self) -> &Arc<KnowledgeTables> {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> QueryRouter {
        QueryRouter::new(Arc::new(KnowledgeTables::load(&test_fixtures::tables_config())))
    }

    #[test]
    fn relational_entity_query_routes_to_graph() {
        let c = router().classify("Which handlers does MsgSend call?");
        assert_eq!(c.recommended_route, Route::Graph);
        assert_eq!(c.detected_entities[0].name, "MsgSend");
        assert_eq!(c.detected_entities[0].confidence, 1.0);
    }

    #[test]
    fn conceptual_query_without_entities_routes_to_vector() {
        let c = router().classify("what is regenerative agriculture");
        assert_eq!(c.recommended_route, Route::Vector);
        assert!(c.detected_entities.is_empty());
        assert_eq!(c.intent, QueryIntent::General);
        assert!((c.confidence - 0.2).abs() < 1e-9);
    }

    #[test]
    fn everything_else_is_unified() {
        let c = router().classify("Who works at Regen Network?");
        assert_eq!(c.recommended_route, Route::Unified);
        assert_eq!(c.intent, QueryIntent::Employment);
        // proper noun 0.6, one intent hit
        assert!((c.confidence - (0.2 + 0.3 + 0.15)).abs() < 1e-9);
    }

    #[test]
    fn confidence_is_monotone_and_bounded() {
        assert!(route_confidence(0.6, 1) < route_confidence(0.8, 1));
        assert!(route_confidence(0.8, 1) < route_confidence(0.8, 2));
        assert_eq!(route_confidence(0.8, 2), route_confidence(0.8, 7));
        assert!(route_confidence(1.0, 5) <= 1.0);
    }
}
