//! Shared fakes for integration testing.
//!
//! Scripted failures, hangs, and latency simulation live here, never
//! in production capabilities.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use switchboard::config::{BreakerConfig, DownstreamConfig, RetryConfig};
use switchboard::downstream::{Downstream, DownstreamError};
use switchboard::Orchestrator;

/// A downstream driven by a closure receiving the 0-based call index.
pub struct ScriptedDownstream<F> {
    calls: Arc<AtomicU32>,
    script: F,
}

impl<F, Fut> ScriptedDownstream<F>
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, DownstreamError>> + Send + 'static,
{
    pub fn new(script: F) -> (Self, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        (
            Self {
                calls: calls.clone(),
                script,
            },
            calls,
        )
    }
}

#[async_trait]
impl<F, Fut> Downstream for ScriptedDownstream<F>
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, DownstreamError>> + Send + 'static,
{
    async fn call(&self, _request: Value) -> Result<Value, DownstreamError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(index).await
    }
}

/// A downstream that never returns; the executor's deadline must cancel
/// it.
pub struct HangingDownstream {
    pub calls: Arc<AtomicU32>,
}

impl HangingDownstream {
    #[allow(dead_code)]
    pub fn new() -> (Self, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl Downstream for HangingDownstream {
    async fn call(&self, _request: Value) -> Result<Value, DownstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

#[allow(dead_code)]
pub fn ok_payload() -> Result<Value, DownstreamError> {
    Ok(json!({ "ok": true }))
}

#[allow(dead_code)]
pub fn transient() -> Result<Value, DownstreamError> {
    Err(DownstreamError::Transient("connection reset".into()))
}

#[allow(dead_code)]
pub fn rejected() -> Result<Value, DownstreamError> {
    Err(DownstreamError::Rejected("invalid request".into()))
}

/// Fast reliability settings for tests: tight timeouts, zero jitter so
/// paused-clock timing is deterministic.
#[allow(dead_code)]
pub fn test_config(name: &str) -> DownstreamConfig {
    DownstreamConfig {
        name: name.to_string(),
        attempt_timeout_ms: 100,
        breaker: BreakerConfig {
            failure_threshold: 3,
            cooldown_ms: 1_000,
            half_open_max_trials: 1,
        },
        retry: RetryConfig {
            max_attempts: 3,
            base_delay_ms: 10,
            multiplier: 2.0,
            jitter_ms: 0,
            max_delay_ms: 100,
        },
    }
}

/// Build an orchestrator with a single registered downstream.
#[allow(dead_code)]
pub fn orchestrator_with(
    config: &DownstreamConfig,
    capability: Arc<dyn Downstream>,
) -> Orchestrator {
    let mut orchestrator = Orchestrator::new();
    orchestrator.register(config, capability);
    orchestrator
}
