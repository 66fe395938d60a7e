//! Orchestrator: composes executor, retry policy, and breaker per call
//! site.
//!
//! # Data Flow
//! ```text
//! caller → call(name, payload, overall_deadline)
//!     → breaker admission (fail fast with circuit-open when shed)
//!     → Call Executor, deadline = min(overall remaining, attempt timeout)
//!     → record completed outcome into breaker
//!     → success: return payload + attempt count
//!     → retryable failure: backoff sleep (lock-free), loop
//!     → otherwise: terminal failure kind + attempt history
//! ```
//!
//! # Design Decisions
//! - The orchestrator is the sole place raw attempt outcomes become the
//!   caller-facing tagged result; callers never see attempt-level errors
//! - The overall deadline is a hard ceiling: a backoff sleep that would
//!   cross it returns `timeout` instead of sleeping
//! - All failures are per-request values; nothing here is process-fatal

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;

use crate::breaker::{BreakerRegistry, BreakerStatus, CircuitBreaker};
use crate::config::DownstreamConfig;
use crate::downstream::Downstream;
use crate::executor::{AttemptRecord, CallExecutor, CallOutcome};
use crate::observability::metrics;
use crate::retry::RetryPolicy;

/// Terminal failure classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The downstream itself reported failure.
    DownstreamError,
    /// The deadline was exceeded before a response.
    Timeout,
    /// The breaker shed the call without attempting it.
    CircuitOpen,
    /// All permitted attempts failed or timed out.
    RetriesExhausted,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::DownstreamError => "downstream-error",
            FailureKind::Timeout => "timeout",
            FailureKind::CircuitOpen => "circuit-open",
            FailureKind::RetriesExhausted => "retries-exhausted",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful orchestration: the payload plus how many attempts it took.
#[derive(Debug)]
pub struct Orchestrated {
    pub payload: Value,
    pub attempts: u32,
}

/// Terminal orchestration failure with diagnostics.
#[derive(Debug, thiserror::Error)]
#[error("call to {downstream} failed: {kind} after {} attempt(s)", attempts.len())]
pub struct OrchestrationError {
    pub downstream: String,
    pub kind: FailureKind,
    /// History of completed attempts (empty when shed by the breaker).
    pub attempts: Vec<AttemptRecord>,
}

/// One registered call site: capability, breaker, policy, executor.
struct CallSite {
    downstream: Arc<dyn Downstream>,
    breaker: Arc<CircuitBreaker>,
    policy: RetryPolicy,
    executor: CallExecutor,
    attempt_timeout: Duration,
}

/// Composes the reliability machinery for every registered downstream.
///
/// Construction happens once at startup; the site table is immutable
/// afterwards. Concurrent callers share only the per-downstream breaker
/// locks.
pub struct Orchestrator {
    sites: HashMap<String, CallSite>,
    breakers: BreakerRegistry,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            sites: HashMap::new(),
            breakers: BreakerRegistry::new(),
        }
    }

    /// Register a downstream capability under its configured name.
    pub fn register(&mut self, config: &DownstreamConfig, capability: Arc<dyn Downstream>) {
        let breaker = self.breakers.register(&config.name, &config.breaker);
        let site = CallSite {
            downstream: capability,
            breaker,
            policy: RetryPolicy::from_config(&config.retry),
            executor: CallExecutor::new(config.name.clone()),
            attempt_timeout: Duration::from_millis(config.attempt_timeout_ms),
        };
        tracing::info!(
            downstream = %config.name,
            max_attempts = config.retry.max_attempts,
            failure_threshold = config.breaker.failure_threshold,
            attempt_timeout_ms = config.attempt_timeout_ms,
            "Downstream registered"
        );
        self.sites.insert(config.name.clone(), site);
    }

    /// Snapshot of breaker states for the status endpoint.
    pub fn breaker_snapshot(&self) -> Vec<BreakerStatus> {
        self.breakers.snapshot()
    }

    /// Execute one logical request against a named downstream.
    pub async fn call(
        &self,
        name: &str,
        request: Value,
        overall_deadline: Instant,
    ) -> Result<Orchestrated, OrchestrationError> {
        let Some(site) = self.sites.get(name) else {
            tracing::warn!(downstream = %name, "Call to unregistered downstream");
            return Err(self.fail(name, FailureKind::DownstreamError, Vec::new()));
        };

        let mut history: Vec<AttemptRecord> = Vec::new();

        for attempt in 1..=site.policy.max_attempts() {
            let now = Instant::now();
            if now >= overall_deadline {
                return Err(self.fail(name, FailureKind::Timeout, history));
            }

            let Some(permit) = site.breaker.try_acquire() else {
                tracing::debug!(downstream = %name, attempt = attempt, "Shed by circuit breaker");
                return Err(self.fail(name, FailureKind::CircuitOpen, history));
            };

            let attempt_deadline = overall_deadline.min(now + site.attempt_timeout);
            let completed = site
                .executor
                .execute(&*site.downstream, request.clone(), attempt, attempt_deadline)
                .await;

            match completed.outcome {
                CallOutcome::Success(payload) => {
                    permit.record_success();
                    metrics::record_call(name, "success");
                    return Ok(Orchestrated {
                        payload,
                        attempts: attempt,
                    });
                }
                ref outcome => {
                    permit.record_failure();
                    let retry = site.policy.should_retry(attempt, outcome);
                    let retryable = site.policy.is_retryable(outcome);
                    history.push(completed.to_record());

                    if retry {
                        let delay = site.policy.next_delay(attempt);
                        if Instant::now() + delay >= overall_deadline {
                            // Sleeping would cross the hard ceiling.
                            return Err(self.fail(name, FailureKind::Timeout, history));
                        }
                        tracing::debug!(
                            downstream = %name,
                            attempt = attempt,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying after backoff"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let kind = if retryable {
                        FailureKind::RetriesExhausted
                    } else {
                        match outcome {
                            CallOutcome::Timeout => FailureKind::Timeout,
                            _ => FailureKind::DownstreamError,
                        }
                    };
                    return Err(self.fail(name, kind, history));
                }
            }
        }

        // max_attempts >= 1 makes the loop body run at least once, and
        // every branch in it returns.
        Err(self.fail(name, FailureKind::RetriesExhausted, history))
    }

    fn fail(
        &self,
        name: &str,
        kind: FailureKind,
        attempts: Vec<AttemptRecord>,
    ) -> OrchestrationError {
        metrics::record_call(name, kind.as_str());
        tracing::info!(
            downstream = %name,
            kind = %kind,
            attempts = attempts.len(),
            "Orchestrated call failed"
        );
        OrchestrationError {
            downstream: name.to_string(),
            kind,
            attempts,
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
