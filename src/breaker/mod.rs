//! Circuit breaker for downstream protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: downstream assumed down, calls fail fast
//! - Half-Open: bounded trial traffic probes for recovery
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures reach threshold
//! Open → Half-Open: cool-down elapsed since opening
//! Half-Open → Closed: a trial call succeeds
//! Half-Open → Open: a trial call fails (cool-down timer resets)
//! ```
//!
//! # Design Decisions
//! - Per-downstream breaker (not global); breakers never share locks
//! - Fail fast in Open state: no downstream invocation, no resource cost
//! - Admission and recording go through a `TrialPermit` so an abandoned
//!   call releases its half-open slot without deciding state
//! - A generation counter makes the first decisive trial outcome win;
//!   stale results from superseded generations are discarded

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::config::BreakerConfig;
use crate::observability::metrics;

pub mod registry;

pub use registry::{BreakerRegistry, BreakerStatus};

/// Breaker state for one downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    /// Set while Open; the cool-down is measured from here.
    opened_at: Option<Instant>,
    /// Trial calls currently in flight while Half-Open.
    trials_in_flight: u32,
    /// Bumped on every state transition. Permits carry the generation
    /// they were issued under; results from older generations are stale.
    generation: u64,
}

/// Per-downstream circuit breaker.
///
/// State reads and the subsequent transition happen inside a single
/// critical section, so concurrent failures cannot both observe
/// "below threshold" and leave the breaker closed.
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    cooldown: Duration,
    half_open_max_trials: u32,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: &BreakerConfig) -> Self {
        Self {
            name: name.into(),
            failure_threshold: config.failure_threshold.max(1),
            cooldown: Duration::from_millis(config.cooldown_ms),
            half_open_max_trials: config.half_open_max_trials.max(1),
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                trials_in_flight: 0,
                generation: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state, resolving an elapsed cool-down to Half-Open.
    pub fn state(&self) -> BreakerState {
        let mut inner = self.lock();
        self.maybe_enter_half_open(&mut inner);
        inner.state
    }

    /// Consecutive failure count (diagnostics only).
    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Ask for admission. Returns a permit when the call may proceed;
    /// `None` means the call must be shed as circuit-open.
    pub fn try_acquire(self: &Arc<Self>) -> Option<CallPermit> {
        let mut inner = self.lock();
        self.maybe_enter_half_open(&mut inner);

        match inner.state {
            BreakerState::Closed => Some(CallPermit::new(self.clone(), inner.generation)),
            BreakerState::Open => None,
            BreakerState::HalfOpen => {
                if inner.trials_in_flight < self.half_open_max_trials {
                    inner.trials_in_flight += 1;
                    Some(CallPermit::new(self.clone(), inner.generation))
                } else {
                    None
                }
            }
        }
    }

    /// Open → Half-Open once the cool-down has elapsed. Caller holds the
    /// lock.
    fn maybe_enter_half_open(&self, inner: &mut BreakerInner) {
        if inner.state != BreakerState::Open {
            return;
        }
        let elapsed = inner
            .opened_at
            .map(|at| at.elapsed() >= self.cooldown)
            .unwrap_or(false);
        if elapsed {
            inner.state = BreakerState::HalfOpen;
            inner.trials_in_flight = 0;
            inner.generation += 1;
            tracing::info!(downstream = %self.name, "Circuit breaker half-open, admitting trials");
            metrics::record_breaker_state(&self.name, BreakerState::HalfOpen);
        }
    }

    fn record(&self, generation: u64, success: bool) {
        let mut inner = self.lock();
        if generation != inner.generation {
            // A decisive outcome already moved the breaker on; this
            // result no longer counts for state purposes.
            return;
        }

        match inner.state {
            BreakerState::Closed => {
                if success {
                    inner.consecutive_failures = 0;
                } else {
                    inner.consecutive_failures += 1;
                    if inner.consecutive_failures >= self.failure_threshold {
                        self.trip_open(&mut inner);
                    }
                }
            }
            BreakerState::HalfOpen => {
                inner.trials_in_flight = inner.trials_in_flight.saturating_sub(1);
                if success {
                    inner.state = BreakerState::Closed;
                    inner.consecutive_failures = 0;
                    inner.opened_at = None;
                    inner.generation += 1;
                    tracing::info!(downstream = %self.name, "Circuit breaker closed after recovery");
                    metrics::record_breaker_state(&self.name, BreakerState::Closed);
                } else {
                    self.trip_open(&mut inner);
                }
            }
            // Generation check above rules this out: opening always bumps
            // the generation.
            BreakerState::Open => {}
        }
    }

    fn trip_open(&self, inner: &mut BreakerInner) {
        inner.state = BreakerState::Open;
        inner.opened_at = Some(Instant::now());
        inner.trials_in_flight = 0;
        inner.generation += 1;
        tracing::warn!(
            downstream = %self.name,
            consecutive_failures = inner.consecutive_failures,
            "Circuit breaker opened"
        );
        metrics::record_breaker_state(&self.name, BreakerState::Open);
    }

    /// Release a half-open slot for a permit dropped without an outcome.
    fn release(&self, generation: u64) {
        let mut inner = self.lock();
        if generation == inner.generation && inner.state == BreakerState::HalfOpen {
            inner.trials_in_flight = inner.trials_in_flight.saturating_sub(1);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Admission token for one attempt.
///
/// Exactly one of `record_success` / `record_failure` should be called
/// for a completed attempt. Dropping the permit without recording (an
/// abandoned call) releases any half-open slot without affecting state.
pub struct CallPermit {
    breaker: Arc<CircuitBreaker>,
    generation: u64,
    recorded: bool,
}

impl CallPermit {
    fn new(breaker: Arc<CircuitBreaker>, generation: u64) -> Self {
        Self {
            breaker,
            generation,
            recorded: false,
        }
    }

    pub fn record_success(mut self) {
        self.recorded = true;
        self.breaker.record(self.generation, true);
    }

    pub fn record_failure(mut self) {
        self.recorded = true;
        self.breaker.record(self.generation, false);
    }
}

impl Drop for CallPermit {
    fn drop(&mut self) {
        if !self.recorded {
            self.breaker.release(self.generation);
        }
    }
}
