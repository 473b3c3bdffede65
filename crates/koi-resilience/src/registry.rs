//! Named circuit breakers, one per external dependency.

use std::sync::Arc;

use dashmap::DashMap;
use koi_core::config::ResilienceConfig;
use koi_core::constants;
use koi_core::models::BreakerSnapshot;

use crate::circuit_breaker::CircuitBreaker;

/// Breakers for the known dependencies exist from construction; unknown
/// names get one lazily with the default breaker config.
#[derive(Debug)]
pub struct BreakerRegistry {
    config: ResilienceConfig,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    pub fn new(config: ResilienceConfig) -> Self {
        let breakers = DashMap::new();
        for dependency in constants::KNOWN_DEPENDENCIES {
            breakers.insert(
                dependency.to_string(),
                Arc::new(CircuitBreaker::new(
                    dependency,
                    config.breaker_for(dependency).clone(),
                )),
            );
        }
        Self { config, breakers }
    }

    pub fn get(&self, dependency: &str) -> Arc<CircuitBreaker> {
        if let Some(breaker) = self.breakers.get(dependency) {
            return Arc::clone(breaker.value());
        }
        let breaker = self
            .breakers
            .entry(dependency.to_string())
            .or_insert_with(|| {
                Arc::new(CircuitBreaker::new(
                    dependency,
                    self.config.breaker_for(dependency).clone(),
                ))
            });
        Arc::clone(breaker.value())
    }

    /// Snapshots of every breaker, sorted by dependency name.
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let mut snapshots: Vec<BreakerSnapshot> = self
            .breakers
            .iter()
            .map(|entry| entry.value().snapshot())
            .collect();
        snapshots.sort_by(|a, b| a.dependency.cmp(&b.dependency));
        snapshots
    }

    pub fn reset_all(&self) {
        for entry in self.breakers.iter() {
            entry.value().reset();
        }
    }
}

impl Default for BreakerRegistry {
    fn default() -> Self {
        Self::new(ResilienceConfig::default())
    }
}
