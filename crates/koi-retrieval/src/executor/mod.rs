//! Dual-branch graph execution with reciprocal rank fusion and a
//! zero-result fallback.

mod mode;
pub mod rrf;

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use koi_core::config::RetrievalConfig;
use koi_core::constants::{GRAPH_API, MAX_QUERY_LIMIT};
use koi_core::errors::{ResilienceError, ValidationError};
use koi_core::models::{Branch, FusedRow, Triple};
use koi_core::traits::{IGraphBackend, IPredicateSimilarity};
use koi_core::{KoiError, KoiResult};
use koi_observability::events;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

pub use mode::ExecutionMode;

use crate::gateway::{GraphGateway, SimilarityGateway};
use crate::predicates::{ExpansionLimits, PredicateSelection, PredicateSelector, SelectionParams};
use crate::query::{GraphQuery, QueryBuilder};
use crate::router::QueryRouter;
use crate::tables::KnowledgeTables;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteOptions {
    pub mode: ExecutionMode,
    pub limit: usize,
    /// Overall budget for the call, shared by every branch.
    pub deadline: Option<Duration>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Auto,
            limit: RetrievalConfig::default().default_limit,
            deadline: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub fused: Vec<FusedRow>,
    pub focused_query_text: Option<String>,
    pub broad_query_text: Option<String>,
    pub fallback_query_text: Option<String>,
    /// Mode actually run, never `Auto`.
    pub mode: ExecutionMode,
    pub fallback_used: bool,
    /// Branches that failed or expired while another branch succeeded.
    pub degraded_branches: Vec<Branch>,
    /// Predicate selection behind the focused branch, when it ran.
    pub selection: Option<PredicateSelection>,
}

/// Reject malformed input before any backend is touched.
pub fn validate(query: &str, limit: usize) -> Result<(), ValidationError> {
    if query.trim().is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    if limit == 0 || limit > MAX_QUERY_LIMIT {
        return Err(ValidationError::LimitOutOfRange {
            limit,
            max: MAX_QUERY_LIMIT,
        });
    }
    Ok(())
}

/// A fixed point in time every branch must finish by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    pub at: Instant,
    pub budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    pub fn expired_error(&self, dependency: &str) -> KoiError {
        ResilienceError::Timeout {
            dependency: dependency.to_string(),
            after_ms: u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX),
        }
        .into()
    }
}

/// How one branch ended.
#[derive(Debug)]
pub(crate) enum Outcome<T> {
    Done(T),
    Failed(KoiError),
    Expired,
}

/// Run `fut` against an optional deadline.
pub(crate) async fn bounded<T>(
    deadline: Option<Deadline>,
    fut: impl Future<Output = KoiResult<T>>,
) -> Outcome<T> {
    let result = match deadline {
        Some(d) => match tokio::time::timeout_at(d.at, fut).await {
            Ok(result) => result,
            Err(_) => return Outcome::Expired,
        },
        None => fut.await,
    };
    match result {
        Ok(value) => Outcome::Done(value),
        Err(e) => Outcome::Failed(e),
    }
}

struct BranchRun {
    text: String,
    rows: Vec<Triple>,
    selection: Option<PredicateSelection>,
}

pub struct DualBranchExecutor<G, S> {
    tables: Arc<KnowledgeTables>,
    router: QueryRouter,
    builder: QueryBuilder,
    selector: PredicateSelector<S>,
    graph: GraphGateway<G>,
    params: SelectionParams,
    rrf_k: u32,
}

impl<G: IGraphBackend, S: IPredicateSimilarity> DualBranchExecutor<G, S> {
    pub fn new(
        tables: Arc<KnowledgeTables>,
        graph: GraphGateway<G>,
        similarity: SimilarityGateway<S>,
        config: &RetrievalConfig,
    ) -> Self {
        let router = QueryRouter::new(Arc::clone(&tables));
        Self {
            builder: QueryBuilder::new(router.clone()),
            selector: PredicateSelector::new(
                Arc::clone(&tables),
                similarity,
                ExpansionLimits::from(config),
            ),
            router,
            tables,
            graph,
            params: SelectionParams::from(config),
            rrf_k: config.rrf_k,
        }
    }

    pub fn router(&self) -> &QueryRouter {
        &self.router
    }

    pub fn graph(&self) -> &GraphGateway<G> {
        &self.graph
    }

    pub async fn execute(&self, query: &str, options: ExecuteOptions) -> KoiResult<ExecutionResult> {
        validate(query, options.limit)?;
        let deadline = options.deadline.map(Deadline::after);
        self.execute_until(query, options.mode, options.limit, deadline).await
    }

    /// Execute against an already-started deadline. Input must be valid.
    pub(crate) async fn execute_until(
        &self,
        query: &str,
        mode: ExecutionMode,
        limit: usize,
        deadline: Option<Deadline>,
    ) -> KoiResult<ExecutionResult> {
        let has_entity = !self.router.entities(query).is_empty();
        let mode = mode.resolve(query, has_entity);

        let (focused, broad) = match mode {
            ExecutionMode::Dual => tokio::join!(
                bounded(deadline, self.run_focused(query, limit)),
                bounded(deadline, self.run_broad(query, limit)),
            ),
            ExecutionMode::Focused => (bounded(deadline, self.run_focused(query, limit)).await, Outcome::Expired),
            _ => (Outcome::Expired, bounded(deadline, self.run_broad(query, limit)).await),
        };
        let ran = [
            (Branch::Focused, mode.runs_focused()),
            (Branch::Broad, mode.runs_broad()),
        ];

        let mut result = ExecutionResult {
            fused: Vec::new(),
            focused_query_text: None,
            broad_query_text: None,
            fallback_query_text: None,
            mode,
            fallback_used: false,
            degraded_branches: Vec::new(),
            selection: None,
        };
        let mut lists: Vec<(Branch, Vec<Triple>)> = Vec::new();
        let mut failures: Vec<(Branch, Outcome<()>)> = Vec::new();

        for ((branch, did_run), outcome) in ran.into_iter().zip([focused, broad]) {
            if !did_run {
                continue;
            }
            match outcome {
                Outcome::Done(run) => {
                    match branch {
                        Branch::Focused => {
                            result.focused_query_text = Some(run.text);
                            result.selection = run.selection;
                        }
                        _ => result.broad_query_text = Some(run.text),
                    }
                    lists.push((branch, run.rows));
                }
                Outcome::Failed(e) => failures.push((branch, Outcome::Failed(e))),
                Outcome::Expired => failures.push((branch, Outcome::Expired)),
            }
        }

        if lists.is_empty() {
            return Err(first_error(failures, deadline));
        }
        for (branch, outcome) in &failures {
            let reason = match outcome {
                Outcome::Failed(e) => e.to_string(),
                _ => "deadline expired".to_string(),
            };
            events::branch_degraded(branch.as_str(), &reason);
            result.degraded_branches.push(*branch);
        }

        if lists.iter().all(|(_, rows)| rows.is_empty()) {
            self.run_fallback(query, limit, deadline, &mut result, &mut lists).await?;
        }

        self.warn_unknown_predicates(&lists);
        let mut fused = rrf::fuse_triples(&lists, self.rrf_k);
        fused.truncate(limit);
        result.fused = fused;
        Ok(result)
    }

    async fn run_focused(&self, query: &str, limit: usize) -> KoiResult<BranchRun> {
        let intent = self.router.intent(query);
        let selection = self.selector.select(query, intent, &self.params).await;
        let graph_query = self.builder.build_focused(query, &selection.predicates, limit, true);
        let mut run = self.run_query(&graph_query).await?;
        run.selection = Some(selection);
        Ok(run)
    }

    async fn run_broad(&self, query: &str, limit: usize) -> KoiResult<BranchRun> {
        let graph_query = self.builder.build_broad(query, limit, true);
        self.run_query(&graph_query).await
    }

    async fn run_query(&self, graph_query: &GraphQuery) -> KoiResult<BranchRun> {
        let rows = self.graph.run(graph_query).await?;
        Ok(BranchRun {
            text: graph_query.to_cypher(),
            rows,
            selection: None,
        })
    }

    /// Unfiltered broad query after an empty result. Skipped when its text
    /// already ran. A failed or expired fallback fails the whole call.
    async fn run_fallback(
        &self,
        query: &str,
        limit: usize,
        deadline: Option<Deadline>,
        result: &mut ExecutionResult,
        lists: &mut Vec<(Branch, Vec<Triple>)>,
    ) -> KoiResult<()> {
        let fallback = self.builder.build_broad(query, limit, false);
        let text = fallback.to_cypher();
        let already_ran = [&result.focused_query_text, &result.broad_query_text]
            .into_iter()
            .any(|t| t.as_deref() == Some(text.as_str()));
        if already_ran {
            return Ok(());
        }

        events::fallback_triggered(query, &text);
        result.fallback_used = true;
        result.fallback_query_text = Some(text);
        match bounded(deadline, self.graph.run(&fallback)).await {
            Outcome::Done(rows) => {
                lists.push((Branch::Broad, rows));
                Ok(())
            }
            Outcome::Failed(e) => {
                events::branch_degraded("fallback", &e.to_string());
                Err(e)
            }
            Outcome::Expired => {
                events::branch_degraded("fallback", "deadline expired");
                Err(first_error(vec![(Branch::Broad, Outcome::Expired)], deadline))
            }
        }
    }

    fn warn_unknown_predicates(&self, lists: &[(Branch, Vec<Triple>)]) {
        if self.tables.consolidation.is_empty() {
            return;
        }
        let unknown: BTreeSet<&str> = lists
            .iter()
            .flat_map(|(_, rows)| rows.iter())
            .map(|t| t.predicate.as_str())
            .filter(|p| !self.tables.is_known_predicate(p))
            .collect();
        for predicate in unknown {
            tracing::warn!(predicate, "graph returned a predicate outside the vocabulary");
        }
    }
}

/// Every branch ended without rows: a timeout only if all of them expired,
/// otherwise the first failure.
fn first_error(failures: Vec<(Branch, Outcome<()>)>, deadline: Option<Deadline>) -> KoiError {
    let mut expired = false;
    for (_, outcome) in failures {
        match outcome {
            Outcome::Failed(e) => return e,
            Outcome::Expired => expired = true,
            Outcome::Done(()) => {}
        }
    }
    match (expired, deadline) {
        (true, Some(d)) => d.expired_error(GRAPH_API),
        _ => KoiError::Unexpected("no graph branch ran".into()),
    }
}
