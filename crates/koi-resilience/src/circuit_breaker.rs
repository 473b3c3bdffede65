//! Per-dependency circuit breaker.
//!
//! `closed` counts failures; reaching the threshold opens the circuit. While
//! `open`, calls are rejected without touching the backend. Once
//! `reset_timeout` has passed since the last failure the next state read moves
//! to `half_open`, which admits a bounded number of trial calls: one success
//! closes the circuit, any failure reopens it.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use koi_core::config::BreakerConfig;
use koi_core::errors::{KoiResult, ResilienceError};
use koi_core::models::{BreakerSnapshot, CircuitState};
use koi_observability::events;
use tokio::time::Instant;

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
    retry_after: Option<DateTime<Utc>>,
    half_open_in_flight: u32,
    /// Bumped on every entry into half-open so permits from an earlier
    /// trial window never touch the current one.
    epoch: u64,
}

impl Inner {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure: None,
            retry_after: None,
            half_open_in_flight: 0,
            epoch: 0,
        }
    }
}

/// Circuit breaker guarding one named dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    dependency: String,
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(dependency: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            dependency: dependency.into(),
            config,
            inner: Mutex::new(Inner::new()),
        }
    }

    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Current state, applying the lazy `open -> half_open` transition.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        self.refresh(&mut inner);
        inner.state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let mut inner = self.lock();
        self.refresh(&mut inner);
        BreakerSnapshot {
            dependency: self.dependency.clone(),
            state: inner.state,
            failure_count: inner.failure_count,
            half_open_in_flight: inner.half_open_in_flight,
            retry_after: match inner.state {
                CircuitState::Open => inner.retry_after,
                _ => None,
            },
        }
    }

    /// Ask for permission to make one call.
    pub fn try_acquire(&self) -> Result<CallPermit<'_>, ResilienceError> {
        let mut inner = self.lock();
        self.refresh(&mut inner);

        match inner.state {
            CircuitState::Closed => Ok(CallPermit::new(self, None)),
            CircuitState::Open => Err(ResilienceError::CircuitOpen {
                dependency: self.dependency.clone(),
                retry_after: inner.retry_after.unwrap_or_else(Utc::now),
            }),
            CircuitState::HalfOpen => {
                if inner.half_open_in_flight >= self.config.half_open_max_calls {
                    return Err(ResilienceError::HalfOpenSaturated {
                        dependency: self.dependency.clone(),
                    });
                }
                inner.half_open_in_flight += 1;
                Ok(CallPermit::new(self, Some(inner.epoch)))
            }
        }
    }

    /// Run `op` under the breaker. Only errors that
    /// [count as failures](koi_core::KoiError::counts_as_failure) are
    /// recorded; other errors release the permit without an outcome.
    pub async fn call<T, Fut>(&self, op: Fut) -> KoiResult<T>
    where
        Fut: Future<Output = KoiResult<T>>,
    {
        let permit = self.try_acquire()?;
        let result = op.await;
        match &result {
            Ok(_) => permit.success(),
            Err(e) if e.counts_as_failure() => permit.failure(),
            Err(_) => drop(permit),
        }
        result
    }

    /// Force the breaker back to `closed` with clean counters.
    pub fn reset(&self) {
        let mut inner = self.lock();
        let from = inner.state;
        *inner = Inner {
            epoch: inner.epoch,
            ..Inner::new()
        };
        if from != CircuitState::Closed {
            events::circuit_state_changed(&self.dependency, from, CircuitState::Closed);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn refresh(&self, inner: &mut Inner) {
        if inner.state != CircuitState::Open {
            return;
        }
        let elapsed = inner
            .last_failure
            .map(|at| at.elapsed() >= self.config.reset_timeout())
            .unwrap_or(true);
        if elapsed {
            self.transition(inner, CircuitState::HalfOpen);
        }
    }

    fn transition(&self, inner: &mut Inner, to: CircuitState) {
        let from = inner.state;
        inner.state = to;
        match to {
            CircuitState::Closed => {
                inner.failure_count = 0;
                inner.half_open_in_flight = 0;
                inner.retry_after = None;
            }
            CircuitState::Open => {
                inner.half_open_in_flight = 0;
                inner.retry_after = Some(
                    Utc::now() + chrono::Duration::milliseconds(self.config.reset_timeout_ms as i64),
                );
            }
            CircuitState::HalfOpen => {
                inner.half_open_in_flight = 0;
                inner.epoch += 1;
            }
        }
        events::circuit_state_changed(&self.dependency, from, to);
    }

    fn on_success(&self, epoch: Option<u64>) {
        let mut inner = self.lock();
        match (inner.state, epoch) {
            (CircuitState::Closed, _) => {
                inner.failure_count = inner.failure_count.saturating_sub(1);
            }
            (CircuitState::HalfOpen, Some(e)) if e == inner.epoch => {
                self.transition(&mut inner, CircuitState::Closed);
            }
            _ => {}
        }
    }

    fn on_failure(&self, epoch: Option<u64>) {
        let mut inner = self.lock();
        let now = Instant::now();
        match (inner.state, epoch) {
            (CircuitState::Closed, _) => {
                inner.failure_count += 1;
                inner.last_failure = Some(now);
                if inner.failure_count >= self.config.failure_threshold {
                    self.transition(&mut inner, CircuitState::Open);
                }
            }
            (CircuitState::HalfOpen, Some(e)) if e == inner.epoch => {
                inner.failure_count += 1;
                inner.last_failure = Some(now);
                self.transition(&mut inner, CircuitState::Open);
            }
            _ => {}
        }
    }

    fn release(&self, epoch: u64) {
        let mut inner = self.lock();
        if inner.state == CircuitState::HalfOpen && inner.epoch == epoch {
            inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
        }
    }
}

/// Admission ticket for one call. Record the outcome with
/// [`success`](Self::success) or [`failure`](Self::failure); dropping it
/// without an outcome frees its half-open slot.
#[derive(Debug)]
#[must_use]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    /// Set for permits granted while half-open.
    epoch: Option<u64>,
    settled: bool,
}

impl<'a> CallPermit<'a> {
    fn new(breaker: &'a CircuitBreaker, epoch: Option<u64>) -> Self {
        Self {
            breaker,
            epoch,
            settled: false,
        }
    }

    pub fn is_trial(&self) -> bool {
        self.epoch.is_some()
    }

    pub fn success(mut self) {
        self.settled = true;
        self.breaker.on_success(self.epoch);
    }

    pub fn failure(mut self) {
        self.settled = true;
        self.breaker.on_failure(self.epoch);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Some(epoch) = self.epoch {
            self.breaker.release(epoch);
        }
    }
}
