//! Aggregate health report generation.

use chrono::{DateTime, Utc};
use koi_core::constants;
use koi_core::models::{BreakerSnapshot, CacheStats, CircuitState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Data collected from the breaker registry and result cache.
#[derive(Debug, Clone, Default)]
pub struct HealthSnapshot {
    pub breakers: Vec<BreakerSnapshot>,
    pub cache: CacheStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub breakers: Vec<BreakerSnapshot>,
    pub cache: CacheStats,
    pub cache_hit_rate: f64,
    pub generated_at: DateTime<Utc>,
}

/// Builds a [`HealthReport`] from a snapshot.
pub struct HealthReporter;

impl HealthReporter {
    pub fn build(snapshot: &HealthSnapshot) -> HealthReport {
        let mut breakers = snapshot.breakers.clone();
        breakers.sort_by(|a, b| a.dependency.cmp(&b.dependency));

        HealthReport {
            status: Self::derive_status(&breakers),
            cache: snapshot.cache,
            cache_hit_rate: snapshot.cache.hit_rate(),
            breakers,
            generated_at: Utc::now(),
        }
    }

    /// Unhealthy when both retrieval backends are open, degraded when any
    /// breaker is not closed, otherwise healthy.
    fn derive_status(breakers: &[BreakerSnapshot]) -> HealthStatus {
        let is_open = |dependency: &str| {
            breakers
                .iter()
                .any(|b| b.dependency == dependency && b.state == CircuitState::Open)
        };
        if is_open(constants::GRAPH_API) && is_open(constants::VECTOR_API) {
            return HealthStatus::Unhealthy;
        }
        if breakers.iter().any(|b| b.state != CircuitState::Closed) {
            return HealthStatus::Degraded;
        }
        HealthStatus::Healthy
    }
}
