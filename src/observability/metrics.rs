//! Metrics collection and exposition.
//!
//! # Metrics
//! - `orchestrator_attempts_total` (counter): attempts by downstream, outcome
//! - `orchestrator_attempt_duration_seconds` (histogram): attempt latency
//! - `orchestrator_calls_total` (counter): logical calls by downstream, result
//! - `orchestrator_breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//!
//! # Design Decisions
//! - Low-overhead updates through the `metrics` facade
//! - Prometheus exporter serves scrapes on its own listener

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::breaker::BreakerState;

/// Install the Prometheus exporter on its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed attempt against a downstream.
pub fn record_attempt(downstream: &str, outcome: &'static str, latency: Duration) {
    metrics::counter!(
        "orchestrator_attempts_total",
        "downstream" => downstream.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "orchestrator_attempt_duration_seconds",
        "downstream" => downstream.to_string()
    )
    .record(latency.as_secs_f64());
}

/// Record the final result of a logical call.
pub fn record_call(downstream: &str, result: &'static str) {
    metrics::counter!(
        "orchestrator_calls_total",
        "downstream" => downstream.to_string(),
        "result" => result
    )
    .increment(1);
}

/// Record a breaker state transition.
pub fn record_breaker_state(downstream: &str, state: BreakerState) {
    let value = match state {
        BreakerState::Closed => 0.0,
        BreakerState::Open => 1.0,
        BreakerState::HalfOpen => 2.0,
    };
    metrics::gauge!(
        "orchestrator_breaker_state",
        "downstream" => downstream.to_string()
    )
    .set(value);
}
