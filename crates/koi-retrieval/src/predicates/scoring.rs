//! Lexical scoring of the canonical predicate vocabulary against a query.

use std::cmp::Ordering;

use koi_core::models::ScoredPredicate;
use koi_core::QueryIntent;

use crate::tables::ConsolidationMap;
use crate::text::{keyword_tokens, split_camel_case};

const INTENT_TERM_BONUS: f64 = 3.0;
const TOKEN_OVERLAP_BONUS: f64 = 2.0;
const USAGE_PRIOR_DIVISOR: f64 = 100.0;
const USAGE_PRIOR_CAP: f64 = 5.0;

/// Score every canonical predicate, best first. Ties break by usage
/// (descending) then name.
pub fn score_predicates(
    consolidation: &ConsolidationMap,
    query: &str,
    intent: QueryIntent,
) -> Vec<ScoredPredicate> {
    let query_tokens = keyword_tokens(query);
    let intent_terms = intent.predicate_terms();

    let mut scored: Vec<ScoredPredicate> = consolidation
        .canonicals()
        .map(|predicate| {
            let text = split_camel_case(predicate);
            let predicate_tokens: Vec<&str> =
                text.split_whitespace().filter(|t| t.len() > 2).collect();
            let usage = consolidation.usage(predicate);

            let mut score = 0.0;
            if intent_terms.iter().any(|term| text.contains(term)) {
                score += INTENT_TERM_BONUS;
            }
            let overlaps = query_tokens
                .iter()
                .filter(|q| {
                    predicate_tokens
                        .iter()
                        .any(|p| q.contains(p) || p.contains(q.as_str()))
                })
                .count();
            score += TOKEN_OVERLAP_BONUS * overlaps as f64;
            score += (usage as f64 / USAGE_PRIOR_DIVISOR).min(USAGE_PRIOR_CAP);

            ScoredPredicate {
                predicate: predicate.to_string(),
                score,
                count: usage,
            }
        })
        .collect();

    scored.sort_by(compare_scored);
    scored
}

fn compare_scored(a: &ScoredPredicate, b: &ScoredPredicate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.count.cmp(&a.count))
        .then_with(|| a.predicate.cmp(&b.predicate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::KnowledgeTables;

    fn consolidation() -> ConsolidationMap {
        KnowledgeTables::load(&test_fixtures::tables_config()).consolidation
    }

    #[test]
    fn structure_query_ranks_parameter_predicates_first() {
        let scored = score_predicates(
            &consolidation(),
            "What parameters does MsgSend require?",
            QueryIntent::Structure,
        );
        let top: Vec<&str> = scored.iter().take(3).map(|s| s.predicate.as_str()).collect();
        // hasParameter: 3 + 2 + 4; the 8.0 tier is ordered by usage
        assert_eq!(top, vec!["hasParameter", "hasField", "handles"]);
        assert_eq!(scored[0].score, 9.0);
        let requires = scored.iter().find(|s| s.predicate == "requires");
        assert_eq!(requires.map(|s| s.score), Some(8.0));
    }

    #[test]
    fn usage_prior_is_capped() {
        let scored = score_predicates(&consolidation(), "zzz", QueryIntent::General);
        assert_eq!(scored[0].predicate, "hasField");
        assert_eq!(scored[0].score, 5.0);
    }

    #[test]
    fn ties_break_by_usage_then_name() {
        let scored = score_predicates(&ConsolidationMap::default(), "x", QueryIntent::General);
        assert!(scored.is_empty());

        let mut a = ScoredPredicate { predicate: "b".into(), score: 1.0, count: 5 };
        let b = ScoredPredicate { predicate: "a".into(), score: 1.0, count: 5 };
        assert_eq!(compare_scored(&a, &b), Ordering::Greater);
        a.count = 6;
        assert_eq!(compare_scored(&a, &b), Ordering::Less);
    }
}
