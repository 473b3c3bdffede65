//! Structured log events for key retrieval operations.
//!
//! Each function emits a `tracing` event with structured fields.

use std::time::Duration;

use koi_core::models::CircuitState;

/// Log a circuit breaker transition. Opening is a warning, everything else info.
pub fn circuit_state_changed(dependency: &str, from: CircuitState, to: CircuitState) {
    if to == CircuitState::Open {
        tracing::warn!(
            event = "circuit_state_changed",
            dependency = %dependency,
            from = %from,
            to = %to,
            "circuit opened"
        );
    } else {
        tracing::info!(
            event = "circuit_state_changed",
            dependency = %dependency,
            from = %from,
            to = %to,
            "circuit state changed"
        );
    }
}

/// Log a scheduled retry.
pub fn retry_scheduled(dependency: &str, attempt: u32, delay: Duration, error: &str) {
    tracing::debug!(
        event = "retry_scheduled",
        dependency = %dependency,
        attempt = attempt,
        delay_ms = delay.as_millis() as u64,
        error = %error,
        "retry scheduled"
    );
}

/// Log a cache lookup.
pub fn cache_lookup(query_type: &str, category: &str, hit: bool) {
    tracing::debug!(
        event = "cache_lookup",
        query_type = %query_type,
        category = %category,
        hit = hit,
        "cache lookup"
    );
}

/// Log the zero-result broad fallback.
pub fn fallback_triggered(query: &str, fallback_query: &str) {
    tracing::info!(
        event = "fallback_triggered",
        query = %query,
        fallback_query = %fallback_query,
        "zero results, running unfiltered broad query"
    );
}

/// Log a branch that failed or expired while another branch succeeded.
pub fn branch_degraded(branch: &str, reason: &str) {
    tracing::warn!(
        event = "branch_degraded",
        branch = %branch,
        reason = %reason,
        "branch degraded"
    );
}

/// Log a routing decision.
pub fn route_selected(route: &str, intent: &str, confidence: f64, entities: usize) {
    tracing::debug!(
        event = "route_selected",
        route = %route,
        intent = %intent,
        confidence = confidence,
        entities = entities,
        "route selected"
    );
}

/// Log a knowledge table load.
pub fn tables_loaded(table: &str, entries: usize) {
    tracing::info!(
        event = "tables_loaded",
        table = %table,
        entries = entries,
        "knowledge table loaded"
    );
}
