//! Call Executor: the single-call primitive.
//!
//! # Responsibilities
//! - Issue exactly one outbound invocation of a downstream capability
//!   with a hard deadline
//! - Classify the result: Success, Failure, or Timeout
//! - Record attempt latency for observability
//!
//! # Design Decisions
//! - Never retries internally; retrying is the Orchestrator's job
//! - Uses Tokio's `timeout_at` so the suspended call is cancelled the
//!   moment the deadline fires

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

use crate::downstream::{Downstream, DownstreamError};
use crate::observability::metrics;

/// Classified result of a single attempt.
#[derive(Debug)]
pub enum CallOutcome {
    /// The downstream returned a payload before the deadline.
    Success(Value),
    /// The downstream itself reported failure.
    Failure(DownstreamError),
    /// The deadline elapsed before the downstream returned.
    Timeout,
}

impl CallOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            CallOutcome::Success(_) => OutcomeKind::Success,
            CallOutcome::Failure(_) => OutcomeKind::Failure,
            CallOutcome::Timeout => OutcomeKind::Timeout,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    fn label(&self) -> &'static str {
        match self {
            CallOutcome::Success(_) => "success",
            CallOutcome::Failure(_) => "failure",
            CallOutcome::Timeout => "timeout",
        }
    }
}

/// Outcome tag without the payload, used in attempt history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    Success,
    Failure,
    Timeout,
}

/// One try against a downstream. Created per attempt, recorded into the
/// breaker and attempt history, then discarded.
#[derive(Debug)]
pub struct CallAttempt {
    /// 1-based attempt number within the logical call.
    pub attempt: u32,
    /// When the attempt started.
    pub started_at: Instant,
    /// Hard deadline the attempt ran under.
    pub deadline: Instant,
    /// Observed latency (capped by the deadline for timeouts).
    pub latency: Duration,
    /// Classified result.
    pub outcome: CallOutcome,
}

impl CallAttempt {
    /// Serializable record for diagnostics, without the payload.
    pub fn to_record(&self) -> AttemptRecord {
        let detail = match &self.outcome {
            CallOutcome::Failure(e) => Some(e.to_string()),
            _ => None,
        };
        AttemptRecord {
            attempt: self.attempt,
            latency_ms: self.latency.as_millis() as u64,
            outcome: self.outcome.kind(),
            detail,
        }
    }
}

/// Attempt history entry surfaced to callers on terminal failure.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub latency_ms: u64,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Executes single attempts against one named downstream.
pub struct CallExecutor {
    downstream_name: String,
}

impl CallExecutor {
    pub fn new(downstream_name: impl Into<String>) -> Self {
        Self {
            downstream_name: downstream_name.into(),
        }
    }

    /// Invoke the capability once with a hard deadline and classify the
    /// outcome.
    pub async fn execute(
        &self,
        downstream: &dyn Downstream,
        request: Value,
        attempt: u32,
        deadline: Instant,
    ) -> CallAttempt {
        let started_at = Instant::now();

        let outcome = match tokio::time::timeout_at(deadline, downstream.call(request)).await {
            Ok(Ok(payload)) => CallOutcome::Success(payload),
            Ok(Err(error)) => CallOutcome::Failure(error),
            Err(_) => CallOutcome::Timeout,
        };

        let latency = started_at.elapsed();
        metrics::record_attempt(&self.downstream_name, outcome.label(), latency);
        tracing::debug!(
            downstream = %self.downstream_name,
            attempt = attempt,
            outcome = outcome.label(),
            latency_ms = latency.as_millis() as u64,
            "Attempt completed"
        );

        CallAttempt {
            attempt,
            started_at,
            deadline,
            latency,
            outcome,
        }
    }
}
