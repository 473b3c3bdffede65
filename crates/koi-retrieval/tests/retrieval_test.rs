//! End-to-end retrieval scenarios over the fixture vocabulary and scripted
//! backends.

use std::sync::Arc;

use koi_core::config::{KoiConfig, RetryConfig};
use koi_core::errors::ResilienceError;
use koi_core::models::{Branch, CircuitState, Route};
use koi_core::traits::NoPredicateSimilarity;
use koi_core::KoiError;
use koi_observability::HealthStatus;
use koi_retrieval::executor::ExecutionMode;
use koi_retrieval::{HybridEngine, HybridHit, HybridOptions, KnowledgeTables};
use test_fixtures::{triple_row, MockGraphBackend, MockSimilarity, MockVectorBackend};

fn config() -> KoiConfig {
    let mut config = KoiConfig::default();
    config.resilience.retry = RetryConfig::none();
    config
}

fn tables() -> Arc<KnowledgeTables> {
    Arc::new(KnowledgeTables::load(&test_fixtures::tables_config()))
}

fn documents() -> Arc<MockVectorBackend> {
    Arc::new(MockVectorBackend::new(vec![
        MockVectorBackend::memory("orn:forum:11", "How credit batches are issued", 0.88),
        MockVectorBackend::memory("orn:docs:4", "Governance of credit classes", 0.81),
    ]))
}

#[tokio::test]
async fn focused_query_for_message_parameters() {
    let graph = Arc::new(MockGraphBackend::new().when_rows(
        "'hasParameter'",
        vec![
            triple_row("MsgSend", "hasParameter", "from_address"),
            triple_row("MsgSend", "hasParameter", "to_address"),
            triple_row("MsgSend", "hasParameter", "amount"),
        ],
    ));
    let engine = HybridEngine::new(
        &config(),
        tables(),
        graph.clone(),
        documents(),
        MockSimilarity::new(&["takesParam", "hasField"]),
    );

    let answer = engine
        .answer(
            "What parameters does MsgSend require?",
            HybridOptions {
                route: Some(Route::Graph),
                ..HybridOptions::default()
            },
        )
        .await
        .unwrap();

    let execution = answer.execution.as_ref().unwrap();
    assert_eq!(execution.mode, ExecutionMode::Focused);
    let selection = execution.selection.as_ref().unwrap();
    assert_eq!(selection.embedding_hits, 2);
    assert!(selection.predicates.iter().any(|p| p == "hasParameter"));

    let text = execution.focused_query_text.as_deref().unwrap_or_default();
    assert!(text.contains("type(r) IN ["));
    assert!(text.contains("s.name =~ '(?i).*MsgSend.*'"));
    assert!(text.contains("LIMIT 50"));

    let objects: Vec<&str> = execution.fused.iter().map(|r| r.object()).collect();
    assert_eq!(objects, vec!["from_address", "to_address", "amount"]);
    assert_eq!(answer.hits.len(), 3);
    assert_eq!(answer.vector_count, 0);
    assert_eq!(graph.call_count(), 1);
}

#[tokio::test]
async fn category_filtered_broad_query_falls_back() {
    let graph = Arc::new(MockGraphBackend::new().when_rows(
        "!canonical_category",
        vec![triple_row("C01 credit class", "governedBy", "Regen Registry")],
    ));
    let engine = HybridEngine::new(&config(), tables(), graph.clone(), documents(), NoPredicateSimilarity);

    let answer = engine
        .answer(
            "ecocredit governance",
            HybridOptions {
                route: Some(Route::Graph),
                ..HybridOptions::default()
            },
        )
        .await
        .unwrap();

    let execution = answer.execution.unwrap();
    assert_eq!(execution.mode, ExecutionMode::Broad);
    assert!(execution.fallback_used);
    let first = execution.broad_query_text.unwrap_or_default();
    assert!(first.contains("r.canonical_category IN ['governance', 'eco_credit']"));
    assert!(first.contains("toLower(type(r)) CONTAINS 'ecocredit'"));
    let fallback = execution.fallback_query_text.unwrap_or_default();
    assert!(!fallback.contains("canonical_category"));
    assert!(fallback.contains("NOT (toLower(s.name) CONTAINS 'webpack'"));
    assert_eq!(graph.call_count(), 2);
    assert_eq!(execution.fused.len(), 1);
}

#[tokio::test]
async fn open_graph_breaker_degrades_to_documents() {
    let graph = Arc::new(MockGraphBackend::failing());
    let vector = documents();
    let engine = HybridEngine::new(&config(), tables(), graph.clone(), vector, NoPredicateSimilarity);

    for _ in 0..5 {
        let answer = engine
            .answer("Regen Registry credit batches", HybridOptions::default())
            .await
            .unwrap();
        assert_eq!(answer.route, Route::Unified);
        assert_eq!(answer.degraded, vec![Branch::Graph]);
    }
    assert_eq!(graph.call_count(), 5);

    let answer = engine
        .answer("Regen Registry credit batches", HybridOptions::default())
        .await
        .unwrap();
    assert_eq!(graph.call_count(), 5);
    assert_eq!(answer.degraded, vec![Branch::Graph]);
    assert!(answer
        .hits
        .iter()
        .all(|h| matches!(h.item, HybridHit::Document(_))));
    assert_eq!(answer.hits.len(), 2);

    let health = engine.health();
    assert_eq!(health.status, HealthStatus::Degraded);
    let graph_breaker = health
        .breakers
        .iter()
        .find(|b| b.dependency == "graph-api")
        .unwrap();
    assert_eq!(graph_breaker.state, CircuitState::Open);
}

#[tokio::test]
async fn graph_route_with_open_breaker_is_retry_later() {
    let engine = HybridEngine::new(
        &config(),
        tables(),
        Arc::new(MockGraphBackend::failing()),
        documents(),
        NoPredicateSimilarity,
    );
    let options = HybridOptions {
        route: Some(Route::Graph),
        ..HybridOptions::default()
    };
    for _ in 0..5 {
        assert!(engine.answer("MsgSend", options.clone()).await.is_err());
    }
    let err = engine.answer("MsgSend", options).await.unwrap_err();
    assert!(matches!(
        err,
        KoiError::Resilience(ResilienceError::CircuitOpen { .. })
    ));
    assert_eq!(err.kind(), koi_core::ErrorKind::RetryLater);
}

#[tokio::test]
async fn source_sensor_restricts_documents() {
    let engine = HybridEngine::new(
        &config(),
        tables(),
        Arc::new(MockGraphBackend::new()),
        documents(),
        NoPredicateSimilarity,
    );
    let answer = engine
        .answer(
            "what is a credit batch",
            HybridOptions {
                source_sensor: Some("forum".into()),
                ..HybridOptions::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(answer.route, Route::Vector);
    assert_eq!(answer.vector_count, 1);
}
