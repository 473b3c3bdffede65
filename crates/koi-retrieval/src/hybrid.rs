//! Hybrid graph + vector answers.
//!
//! The router recommends a route; the graph side runs through the
//! dual-branch executor, the vector side through the vector gateway. In
//! unified mode both run concurrently and their rankings are fused under
//! the `graph` and `vector` labels. A failed side degrades the answer
//! instead of failing it.

use std::sync::Arc;
use std::time::Duration;

use koi_cache::{QueryType, ResultCache};
use koi_core::config::{KoiConfig, RetrievalConfig};
use koi_core::constants::{GRAPH_API, TOOL_HYBRID, VECTOR_API};
use koi_core::models::{
    Branch, Classification, Fused, Route, Triple, VectorHealth, VectorMemory, VectorQuery, VectorStats,
};
use koi_core::traits::{IGraphBackend, IPredicateSimilarity, IVectorBackend};
use koi_core::{KoiError, KoiResult};
use koi_observability::{events, HealthReport, HealthReporter, HealthSnapshot};
use koi_resilience::ResilienceShell;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::executor::{bounded, validate, Deadline, DualBranchExecutor, ExecutionMode, ExecutionResult, Outcome};
use crate::gateway::{Gateway, GraphGateway, SimilarityGateway, VectorGateway};
use crate::router::QueryRouter;
use crate::tables::KnowledgeTables;

/// One ranked hit: a graph statement or a vector document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HybridHit {
    Statement(Triple),
    Document(VectorMemory),
}

impl HybridHit {
    fn fusion_key(&self) -> (u8, String, String, String) {
        match self {
            Self::Statement(t) => (0, t.subject.clone(), t.predicate.clone(), t.object.clone()),
            Self::Document(m) => (1, m.rid.clone(), String::new(), String::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HybridOptions {
    /// Overrides the router's recommendation.
    pub route: Option<Route>,
    pub limit: usize,
    pub mode: ExecutionMode,
    pub deadline: Option<Duration>,
    /// Restrict vector hits to one source sensor.
    pub source_sensor: Option<String>,
}

impl Default for HybridOptions {
    fn default() -> Self {
        Self {
            route: None,
            limit: RetrievalConfig::default().default_limit,
            mode: ExecutionMode::Auto,
            deadline: None,
            source_sensor: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridAnswer {
    pub classification: Classification,
    /// Route actually taken.
    pub route: Route,
    pub hits: Vec<Fused<HybridHit>>,
    /// Graph execution details, when the graph side answered.
    pub execution: Option<ExecutionResult>,
    pub vector_count: usize,
    /// `graph` / `vector` when that side failed or expired.
    pub degraded: Vec<Branch>,
}

impl HybridAnswer {
    /// No side and no graph branch was degraded.
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
            && self
                .execution
                .as_ref()
                .map_or(true, |e| e.degraded_branches.is_empty())
    }
}

pub struct HybridEngine<G, V, S> {
    router: QueryRouter,
    executor: DualBranchExecutor<G, S>,
    vector: VectorGateway<V>,
    gateway: Gateway,
    rrf_k: u32,
}

impl<G, V, S> HybridEngine<G, V, S>
where
    G: IGraphBackend,
    V: IVectorBackend,
    S: IPredicateSimilarity,
{
    /// Engine with a fresh breaker registry and cache built from `config`.
    pub fn new(config: &KoiConfig, tables: Arc<KnowledgeTables>, graph: G, vector: V, similarity: S) -> Self {
        let gateway = Gateway::new(
            ResilienceShell::from_config(config),
            Arc::new(ResultCache::new(&config.cache)),
        );
        Self::with_gateway(config, gateway, tables, graph, vector, similarity)
    }

    pub fn with_gateway(
        config: &KoiConfig,
        gateway: Gateway,
        tables: Arc<KnowledgeTables>,
        graph: G,
        vector: V,
        similarity: S,
    ) -> Self {
        let executor = DualBranchExecutor::new(
            Arc::clone(&tables),
            GraphGateway::new(graph, gateway.clone(), config.backends.graph_name.clone()),
            SimilarityGateway::new(similarity, gateway.clone()),
            &config.retrieval,
        );
        Self {
            router: QueryRouter::new(tables),
            executor,
            vector: VectorGateway::new(vector, gateway.clone()),
            gateway,
            rrf_k: config.retrieval.rrf_k,
        }
    }

    pub fn router(&self) -> &QueryRouter {
        &self.router
    }

    pub fn executor(&self) -> &DualBranchExecutor<G, S> {
        &self.executor
    }

    pub fn vector(&self) -> &VectorGateway<V> {
        &self.vector
    }

    /// Answer `query`. Complete answers are cached; degraded ones are not.
    pub async fn answer(&self, query: &str, options: HybridOptions) -> KoiResult<HybridAnswer> {
        validate(query, options.limit)?;
        let params = json!({
            "query": query,
            "route": options.route,
            "limit": options.limit,
            "mode": options.mode,
            "source_sensor": options.source_sensor,
        });
        let cache = self.gateway.cache();
        if let Some(cached) = cache.get_typed::<HybridAnswer>(TOOL_HYBRID, QueryType::HybridSearch, &params) {
            return Ok(cached);
        }
        let answer = self.answer_uncached(query, &options).await?;
        if answer.is_complete() {
            cache.set_typed(TOOL_HYBRID, QueryType::HybridSearch, &params, &answer);
        }
        Ok(answer)
    }

    async fn answer_uncached(&self, query: &str, options: &HybridOptions) -> KoiResult<HybridAnswer> {
        let deadline = options.deadline.map(Deadline::after);
        let classification = self.router.classify(query);
        let route = options.route.unwrap_or(classification.recommended_route);

        let mut vector_query = VectorQuery::new(query, options.limit);
        if let Some(sensor) = &options.source_sensor {
            vector_query = vector_query.with_source_sensor(sensor.clone());
        }
        let graph_side = bounded(
            deadline,
            self.executor.execute_until(query, options.mode, options.limit, deadline),
        );
        let vector_side = bounded(deadline, self.vector.search(&vector_query));

        let (graph, vector) = match route {
            Route::Graph => (Some(graph_side.await), None),
            Route::Vector => (None, Some(vector_side.await)),
            Route::Unified => {
                let (g, v) = tokio::join!(graph_side, vector_side);
                (Some(g), Some(v))
            }
        };

        let mut execution: Option<ExecutionResult> = None;
        let mut memories: Option<Vec<VectorMemory>> = None;
        let mut failures: Vec<(Branch, Option<KoiError>)> = Vec::new();

        match graph {
            Some(Outcome::Done(result)) => execution = Some(result),
            Some(Outcome::Failed(e)) => failures.push((Branch::Graph, Some(e))),
            Some(Outcome::Expired) => failures.push((Branch::Graph, None)),
            None => {}
        }
        match vector {
            Some(Outcome::Done(found)) => memories = Some(found),
            Some(Outcome::Failed(e)) => failures.push((Branch::Vector, Some(e))),
            Some(Outcome::Expired) => failures.push((Branch::Vector, None)),
            None => {}
        }

        if execution.is_none() && memories.is_none() {
            return Err(side_error(failures, deadline));
        }
        let mut degraded = Vec::new();
        for (branch, error) in &failures {
            let reason = error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "deadline expired".to_string());
            events::branch_degraded(branch.as_str(), &reason);
            degraded.push(*branch);
        }

        let vector_count = memories.as_ref().map_or(0, Vec::len);
        let hits = self.rank(execution.as_ref(), memories, options.limit);
        Ok(HybridAnswer {
            classification,
            route,
            hits,
            execution,
            vector_count,
            degraded,
        })
    }

    /// Graph-only answers keep the executor's ranking; anything with
    /// documents is fused.
    fn rank(
        &self,
        execution: Option<&ExecutionResult>,
        memories: Option<Vec<VectorMemory>>,
        limit: usize,
    ) -> Vec<Fused<HybridHit>> {
        let statements: Vec<Fused<HybridHit>> = execution
            .map(|e| {
                e.fused
                    .iter()
                    .map(|row| Fused {
                        item: HybridHit::Statement(row.item.clone()),
                        score: row.score,
                        sources: row.sources.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let Some(memories) = memories else {
            return statements;
        };
        let lists: [(Branch, Vec<HybridHit>); 2] = [
            (Branch::Graph, statements.into_iter().map(|f| f.item).collect()),
            (Branch::Vector, memories.into_iter().map(HybridHit::Document).collect()),
        ];
        let mut fused = crate::executor::rrf::fuse(&lists, self.rrf_k, HybridHit::fusion_key);
        fused.truncate(limit);
        fused
    }

    /// Breaker states and cache counters.
    pub fn health(&self) -> HealthReport {
        HealthReporter::build(&HealthSnapshot {
            breakers: self.gateway.shell().registry().snapshots(),
            cache: self.gateway.cache().stats(),
        })
    }

    pub async fn vector_health(&self) -> KoiResult<VectorHealth> {
        self.vector.health().await
    }

    pub async fn vector_stats(&self) -> KoiResult<VectorStats> {
        self.vector.stats().await
    }
}

fn side_error(failures: Vec<(Branch, Option<KoiError>)>, deadline: Option<Deadline>) -> KoiError {
    let mut expired = None;
    for (branch, error) in failures {
        match error {
            Some(e) => return e,
            None => {
                expired.get_or_insert(branch);
            }
        }
    }
    match (expired, deadline) {
        (Some(branch), Some(d)) => {
            let dependency = if branch == Branch::Vector { VECTOR_API } else { GRAPH_API };
            d.expired_error(dependency)
        }
        _ => KoiError::Unexpected("no retrieval side ran".into()),
    }
}
