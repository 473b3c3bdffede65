use koi_core::constants;
use koi_core::models::{BreakerSnapshot, CacheStats, CircuitState};
use koi_observability::health::{HealthReporter, HealthSnapshot, HealthStatus};

fn breaker(dependency: &str, state: CircuitState) -> BreakerSnapshot {
    BreakerSnapshot {
        dependency: dependency.to_string(),
        state,
        failure_count: 0,
        half_open_in_flight: 0,
        retry_after: None,
    }
}

fn all_closed() -> Vec<BreakerSnapshot> {
    constants::KNOWN_DEPENDENCIES
        .iter()
        .map(|d| breaker(d, CircuitState::Closed))
        .collect()
}

#[test]
fn all_closed_is_healthy() {
    let report = HealthReporter::build(&HealthSnapshot {
        breakers: all_closed(),
        cache: CacheStats::default(),
    });
    assert_eq!(report.status, HealthStatus::Healthy);
    assert_eq!(report.breakers.len(), 4);
    assert_eq!(report.cache_hit_rate, 0.0);
}

#[test]
fn any_open_or_half_open_is_degraded() {
    for state in [CircuitState::Open, CircuitState::HalfOpen] {
        let mut breakers = all_closed();
        breakers[0] = breaker(constants::GRAPH_API, state);
        let report = HealthReporter::build(&HealthSnapshot {
            breakers,
            cache: CacheStats::default(),
        });
        assert_eq!(report.status, HealthStatus::Degraded, "{state}");
    }
}

#[test]
fn both_retrieval_backends_open_is_unhealthy() {
    let breakers = vec![
        breaker(constants::GRAPH_API, CircuitState::Open),
        breaker(constants::VECTOR_API, CircuitState::Open),
        breaker(constants::DATABASE, CircuitState::Closed),
    ];
    let report = HealthReporter::build(&HealthSnapshot {
        breakers,
        cache: CacheStats::default(),
    });
    assert_eq!(report.status, HealthStatus::Unhealthy);
}

#[test]
fn report_carries_cache_counters_and_sorted_breakers() {
    let report = HealthReporter::build(&HealthSnapshot {
        breakers: vec![
            breaker(constants::VECTOR_API, CircuitState::Closed),
            breaker(constants::DATABASE, CircuitState::Closed),
        ],
        cache: CacheStats {
            hits: 3,
            misses: 1,
            inserts: 1,
            entries: 1,
        },
    });
    assert_eq!(report.cache.hits, 3);
    assert!((report.cache_hit_rate - 0.75).abs() < 1e-9);
    assert_eq!(report.breakers[0].dependency, constants::DATABASE);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[test]
fn events_do_not_panic_without_subscriber() {
    use koi_observability::events;
    use std::time::Duration;

    events::circuit_state_changed("graph-api", CircuitState::Closed, CircuitState::Open);
    events::retry_scheduled("graph-api", 1, Duration::from_millis(10), "refused");
    events::cache_lookup("graph_focused", "semi_static", true);
    events::fallback_triggered("q", "MATCH ... LIMIT 5");
    events::branch_degraded("broad", "timeout");
    events::route_selected("graph", "structure", 0.9, 1);
    events::tables_loaded("entities", 0);
}
