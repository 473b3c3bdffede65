//! Property tests for koi-retrieval: coverage growth, fusion, query
//! serialization, routing.

use std::sync::{Arc, LazyLock};

use proptest::prelude::*;

use koi_core::constants::MAX_QUERY_LIMIT;
use koi_core::models::{Branch, Triple};
use koi_core::QueryIntent;
use koi_retrieval::executor::rrf::fuse_triples;
use koi_retrieval::predicates::{select_with_ranking, ExpansionLimits, SelectionParams};
use koi_retrieval::{KnowledgeTables, QueryBuilder, QueryRouter};

static TABLES: LazyLock<Arc<KnowledgeTables>> =
    LazyLock::new(|| Arc::new(KnowledgeTables::load(&test_fixtures::tables_config())));

fn intent_strategy() -> impl Strategy<Value = QueryIntent> {
    prop::sample::select(QueryIntent::ALL.to_vec())
}

fn triples_strategy() -> impl Strategy<Value = Vec<Triple>> {
    prop::collection::vec(
        (0u8..6, prop::sample::select(vec!["calls", "hasField", "handles"])),
        0..8,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .map(|(s, p)| Triple::new(format!("node{s}"), p, "target"))
            .collect()
    })
}

fn query_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "What parameters does MsgSend require?",
        "show all about the EcocreditKeeper",
        "Who works at Regen Network?",
        "ecocredit governance proposals",
        "how many credit batches were retired",
        "what is regenerative grazing",
    ])
    .prop_map(str::to_string)
}

proptest! {
    #[test]
    fn selection_grows_with_coverage_target(
        query in query_strategy(),
        intent in intent_strategy(),
        a in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
        base_k in 1usize..6,
        step in 1usize..5,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let limits = ExpansionLimits::default();
        let params = |target| SelectionParams { base_k, coverage_target: target, max_k: 15, step };

        let smaller = select_with_ranking(&TABLES, &query, intent, &params(low), &limits, &[]);
        let larger = select_with_ranking(&TABLES, &query, intent, &params(high), &limits, &[]);

        prop_assert!(!smaller.is_empty());
        prop_assert!(smaller.k <= larger.k);
        prop_assert!(smaller.len() <= larger.len());
        if larger.k < 15 {
            prop_assert!(larger.coverage >= high);
        }
    }

    #[test]
    fn fusion_ignores_branch_order(focused in triples_strategy(), broad in triples_strategy()) {
        let forward = fuse_triples(&[(Branch::Focused, focused.clone()), (Branch::Broad, broad.clone())], 60);
        let backward = fuse_triples(&[(Branch::Broad, broad), (Branch::Focused, focused)], 60);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn fusing_a_list_with_itself_is_idempotent(rows in triples_strategy()) {
        let once = fuse_triples(&[(Branch::Broad, rows.clone())], 60);
        let twice = fuse_triples(&[(Branch::Broad, rows.clone()), (Branch::Broad, rows)], 60);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn fused_scores_are_non_increasing(focused in triples_strategy(), broad in triples_strategy()) {
        let fused = fuse_triples(&[(Branch::Focused, focused), (Branch::Broad, broad)], 60);
        for pair in fused.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn every_query_carries_a_limit(query in "[ -~]{1,60}", limit in 0usize..2_000, apply in any::<bool>()) {
        let builder = QueryBuilder::new(QueryRouter::new(Arc::clone(&TABLES)));
        let expected = format!("\nLIMIT {}", limit.clamp(1, MAX_QUERY_LIMIT));
        let broad = builder.build_broad(&query, limit, apply).to_cypher();
        let focused = builder.build_focused(&query, &["calls".to_string()], limit, apply).to_cypher();
        prop_assert!(broad.ends_with(&expected));
        prop_assert!(focused.ends_with(&expected));
    }

    #[test]
    fn routing_is_deterministic(query in "[ -~]{0,80}") {
        let router = QueryRouter::new(Arc::clone(&TABLES));
        let first = router.classify(&query);
        let second = router.classify(&query);
        prop_assert!((0.0..=1.0).contains(&first.confidence));
        prop_assert_eq!(first, second);
    }
}
