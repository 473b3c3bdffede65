//! Backend gateways. Every call goes cache → resilience shell → backend.

use std::sync::Arc;

use koi_cache::{QueryType, ResultCache};
use koi_core::config::RetryConfig;
use koi_core::constants::{GRAPH_API, SIMILARITY_API, TOOL_GRAPH, TOOL_SIMILARITY, TOOL_VECTOR, VECTOR_API};
use koi_core::models::{Branch, ScoredPredicate, Triple, VectorHealth, VectorMemory, VectorQuery, VectorStats};
use koi_core::traits::{IGraphBackend, IPredicateSimilarity, IVectorBackend};
use koi_core::KoiResult;
use koi_resilience::ResilienceShell;
use serde_json::json;

use crate::query::GraphQuery;
use crate::search::vector_search;

/// Resilience shell and result cache shared by all gateways.
#[derive(Debug, Clone)]
pub struct Gateway {
    shell: ResilienceShell,
    cache: Arc<ResultCache>,
}

impl Gateway {
    pub fn new(shell: ResilienceShell, cache: Arc<ResultCache>) -> Self {
        Self { shell, cache }
    }

    pub fn shell(&self) -> &ResilienceShell {
        &self.shell
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new(
            ResilienceShell::new(Default::default(), Default::default()),
            Arc::new(ResultCache::default()),
        )
    }
}

#[derive(Debug, Clone)]
pub struct GraphGateway<G> {
    backend: G,
    gateway: Gateway,
    graph: String,
}

impl<G: IGraphBackend> GraphGateway<G> {
    pub fn new(backend: G, gateway: Gateway, graph: impl Into<String>) -> Self {
        Self {
            backend,
            gateway,
            graph: graph.into(),
        }
    }

    pub fn backend(&self) -> &G {
        &self.backend
    }

    /// Run `query` and convert its rows into statements. Rows missing a
    /// column are dropped.
    pub async fn run(&self, query: &GraphQuery) -> KoiResult<Vec<Triple>> {
        let request = query.to_request(&self.graph);
        let query_type = match query.branch {
            Branch::Focused => QueryType::GraphFocused,
            _ => QueryType::GraphBroad,
        };
        let params = json!({ "graph": request.graph, "query": request.query });

        self.gateway
            .cache
            .get_or_try_insert(TOOL_GRAPH, query_type, &params, async {
                let rows = self
                    .gateway
                    .shell
                    .call(GRAPH_API, || self.backend.run(&request))
                    .await?;
                let total = rows.len();
                let triples: Vec<Triple> = rows.iter().filter_map(Triple::from_row).collect();
                if triples.len() < total {
                    tracing::debug!(dropped = total - triples.len(), "graph rows without statement columns");
                }
                Ok(triples)
            })
            .await
    }
}

#[derive(Debug, Clone)]
pub struct VectorGateway<V> {
    backend: V,
    gateway: Gateway,
}

impl<V: IVectorBackend> VectorGateway<V> {
    pub fn new(backend: V, gateway: Gateway) -> Self {
        Self { backend, gateway }
    }

    pub fn backend(&self) -> &V {
        &self.backend
    }

    /// Search, then drop memories outside the requested source.
    pub async fn search(&self, query: &VectorQuery) -> KoiResult<Vec<VectorMemory>> {
        let params = serde_json::to_value(query)?;
        let memories = self
            .gateway
            .cache
            .get_or_try_insert(TOOL_VECTOR, QueryType::VectorSearch, &params, async {
                self.gateway
                    .shell
                    .call(VECTOR_API, || self.backend.search(query))
                    .await
            })
            .await?;
        Ok(vector_search::post_filter(memories, query))
    }

    /// Backend health. Volatile, so every call reaches the backend.
    pub async fn health(&self) -> KoiResult<VectorHealth> {
        self.gateway
            .cache
            .get_or_try_insert(TOOL_VECTOR, QueryType::Health, &json!({}), async {
                self.gateway
                    .shell
                    .call(VECTOR_API, || self.backend.health())
                    .await
            })
            .await
    }

    /// Corpus counters. Volatile like health.
    pub async fn stats(&self) -> KoiResult<VectorStats> {
        self.gateway
            .cache
            .get_or_try_insert(TOOL_VECTOR, QueryType::Stats, &json!({}), async {
                self.gateway
                    .shell
                    .call(VECTOR_API, || self.backend.stats())
                    .await
            })
            .await
    }
}

/// Best-effort predicate similarity: failures and a disabled service both
/// yield an empty ranking. Calls are never retried; one timeout bounds them.
#[derive(Debug, Clone)]
pub struct SimilarityGateway<S> {
    backend: S,
    gateway: Gateway,
    shell: ResilienceShell,
}

impl<S: IPredicateSimilarity> SimilarityGateway<S> {
    pub fn new(backend: S, gateway: Gateway) -> Self {
        let shell = gateway.shell.clone().with_retry(RetryConfig::none());
        Self { backend, gateway, shell }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_enabled()
    }

    pub async fn similar(&self, query: &str, top_k: usize) -> Vec<ScoredPredicate> {
        if !self.backend.is_enabled() || top_k == 0 {
            return Vec::new();
        }
        let params = json!({ "query": query, "top_k": top_k });
        let result = self
            .gateway
            .cache
            .get_or_try_insert(TOOL_SIMILARITY, QueryType::PredicateSimilarity, &params, async {
                self.shell
                    .call(SIMILARITY_API, || self.backend.similar(query, top_k))
                    .await
            })
            .await;
        match result {
            Ok(ranking) => ranking,
            Err(e) => {
                tracing::warn!(error = %e, "predicate similarity unavailable, continuing without it");
                Vec::new()
            }
        }
    }
}
