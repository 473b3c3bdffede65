//! Scripted backends. Every mock counts its calls so tests can assert that
//! a rejected call never reached I/O.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use koi_core::errors::{BackendError, TransientCause};
use koi_core::models::{GraphRequest, GraphRow, ScoredPredicate, VectorHealth, VectorMemory, VectorQuery, VectorStats};
use koi_core::traits::{IGraphBackend, IPredicateSimilarity, IVectorBackend};
use koi_core::{constants, KoiResult};

/// What a graph mock does for a matching query.
#[derive(Debug, Clone)]
pub enum GraphBehavior {
    Rows(Vec<GraphRow>),
    Fail(TransientCause),
    /// Reject the query as malformed.
    Reject(u16),
    /// Sleep, then return the rows.
    Delay(Duration, Vec<GraphRow>),
}

impl GraphBehavior {
    async fn perform(self, dependency: &str) -> KoiResult<Vec<GraphRow>> {
        match self {
            Self::Rows(rows) => Ok(rows),
            Self::Fail(cause) => Err(BackendError::Transient {
                dependency: dependency.to_string(),
                cause,
                detail: "scripted failure".into(),
            }
            .into()),
            Self::Reject(status) => {
                Err(BackendError::from_status(dependency, status, "scripted rejection").into())
            }
            Self::Delay(delay, rows) => {
                tokio::time::sleep(delay).await;
                Ok(rows)
            }
        }
    }
}

/// Graph backend answering by substring rules over the query text. The
/// first rule whose needle occurs in the query wins; a rule whose needle
/// starts with `!` matches when the rest does NOT occur.
#[derive(Debug)]
pub struct MockGraphBackend {
    rules: Vec<(String, GraphBehavior)>,
    fallback: GraphBehavior,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl MockGraphBackend {
    /// Returns no rows for every query.
    pub fn new() -> Self {
        Self::with_default(GraphBehavior::Rows(Vec::new()))
    }

    pub fn with_default(fallback: GraphBehavior) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a transient error.
    pub fn failing() -> Self {
        Self::with_default(GraphBehavior::Fail(TransientCause::ConnectionRefused))
    }

    /// Every call sleeps for `delay` before answering with no rows.
    pub fn slow(delay: Duration) -> Self {
        Self::with_default(GraphBehavior::Delay(delay, Vec::new()))
    }

    pub fn when(mut self, needle: impl Into<String>, behavior: GraphBehavior) -> Self {
        self.rules.push((needle.into(), behavior));
        self
    }

    pub fn when_rows(self, needle: impl Into<String>, rows: Vec<GraphRow>) -> Self {
        self.when(needle, GraphBehavior::Rows(rows))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Query texts in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    fn behavior_for(&self, query: &str) -> GraphBehavior {
        self.rules
            .iter()
            .find(|(needle, _)| match needle.strip_prefix('!') {
                Some(absent) => !query.contains(absent),
                None => query.contains(needle.as_str()),
            })
            .map(|(_, behavior)| behavior.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for MockGraphBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl IGraphBackend for MockGraphBackend {
    async fn run(&self, request: &GraphRequest) -> KoiResult<Vec<GraphRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(request.query.clone());
        }
        let behavior = self.behavior_for(&request.query);
        behavior.perform(constants::GRAPH_API).await
    }
}

/// What a vector mock does for every search.
#[derive(Debug, Clone)]
pub enum VectorBehavior {
    Memories(Vec<VectorMemory>),
    Fail(TransientCause),
    Delay(Duration, Vec<VectorMemory>),
}

#[derive(Debug)]
pub struct MockVectorBackend {
    behavior: VectorBehavior,
    healthy: bool,
    calls: AtomicUsize,
    status_calls: AtomicUsize,
    last_query: Mutex<Option<VectorQuery>>,
}

impl MockVectorBackend {
    pub fn new(memories: Vec<VectorMemory>) -> Self {
        Self::with_behavior(VectorBehavior::Memories(memories))
    }

    pub fn with_behavior(behavior: VectorBehavior) -> Self {
        Self {
            behavior,
            healthy: true,
            calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self::with_behavior(VectorBehavior::Fail(TransientCause::Status(503)))
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Health and stats calls.
    pub fn status_call_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<VectorQuery> {
        self.last_query.lock().ok().and_then(|q| q.clone())
    }

    /// A memory with the given id, text, and similarity.
    pub fn memory(rid: &str, content: &str, similarity: f64) -> VectorMemory {
        VectorMemory {
            rid: rid.to_string(),
            content: content.to_string(),
            similarity,
            source_sensor: None,
            url: None,
            published_at: None,
        }
    }
}

impl IVectorBackend for MockVectorBackend {
    async fn search(&self, query: &VectorQuery) -> KoiResult<Vec<VectorMemory>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_query.lock() {
            *last = Some(query.clone());
        }
        match self.behavior.clone() {
            VectorBehavior::Memories(memories) => Ok(memories),
            VectorBehavior::Fail(cause) => Err(BackendError::Transient {
                dependency: constants::VECTOR_API.to_string(),
                cause,
                detail: "scripted failure".into(),
            }
            .into()),
            VectorBehavior::Delay(delay, memories) => {
                tokio::time::sleep(delay).await;
                Ok(memories)
            }
        }
    }

    async fn health(&self) -> KoiResult<VectorHealth> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(VectorHealth {
            status: if self.healthy { "healthy" } else { "unhealthy" }.to_string(),
            database: Some(if self.healthy { "connected" } else { "down" }.to_string()),
        })
    }

    /// Counts the scripted memories by source sensor.
    async fn stats(&self) -> KoiResult<VectorStats> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let memories = match &self.behavior {
            VectorBehavior::Memories(m) | VectorBehavior::Delay(_, m) => m.as_slice(),
            VectorBehavior::Fail(_) => &[],
        };
        let mut stats = VectorStats {
            total_documents: memories.len() as u64,
            ..VectorStats::default()
        };
        for memory in memories {
            let source = memory.source_sensor.clone().unwrap_or_else(|| "unknown".into());
            *stats.by_source.entry(source).or_default() += 1;
        }
        Ok(stats)
    }
}

/// Predicate similarity service returning a fixed ranking, or failing.
#[derive(Debug)]
pub struct MockSimilarity {
    ranking: Option<Vec<ScoredPredicate>>,
    calls: AtomicUsize,
}

impl MockSimilarity {
    pub fn new(predicates: &[&str]) -> Self {
        let n = predicates.len().max(1) as f64;
        let ranking = predicates
            .iter()
            .enumerate()
            .map(|(i, p)| ScoredPredicate {
                predicate: p.to_string(),
                score: 1.0 - i as f64 / n,
                count: 0,
            })
            .collect();
        Self {
            ranking: Some(ranking),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            ranking: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IPredicateSimilarity for MockSimilarity {
    async fn similar(&self, _query: &str, top_k: usize) -> KoiResult<Vec<ScoredPredicate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.ranking {
            Some(ranking) => Ok(ranking.iter().take(top_k).cloned().collect()),
            None => Err(BackendError::Transient {
                dependency: constants::SIMILARITY_API.to_string(),
                cause: TransientCause::ConnectionRefused,
                detail: "scripted failure".into(),
            }
            .into()),
        }
    }
}
