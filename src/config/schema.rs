//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! orchestrator. All types derive Serde traits for deserialization from
//! config files. Configuration is immutable once loaded.

use serde::{Deserialize, Serialize};

/// Root configuration for the orchestrator service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration for the caller-facing HTTP layer.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Downstream dependency definitions.
    pub downstreams: Vec<DownstreamConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Overall deadline for a single orchestrated call, in milliseconds.
    /// This is the hard ceiling across all attempts and backoff sleeps.
    pub call_deadline_ms: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            call_deadline_ms: 10_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A named downstream dependency and the reliability settings governing
/// calls to it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownstreamConfig {
    /// Unique downstream identifier (e.g., "auth", "payment").
    pub name: String,

    /// Timeout for a single attempt, in milliseconds.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    /// Circuit breaker settings.
    #[serde(default)]
    pub breaker: BreakerConfig,

    /// Retry and backoff settings.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl DownstreamConfig {
    /// Build a config with default reliability settings for a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            breaker: BreakerConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_attempt_timeout_ms() -> u64 {
    2_000
}

/// Circuit breaker configuration for one downstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures before the breaker opens.
    pub failure_threshold: u32,

    /// Cool-down after opening before trial calls are admitted, in
    /// milliseconds.
    pub cooldown_ms: u64,

    /// Maximum concurrent trial calls admitted while half-open.
    pub half_open_max_trials: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown_ms: 30_000,
            half_open_max_trials: 1,
        }
    }
}

/// Retry configuration for one downstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per logical call (first try included).
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Backoff multiplier applied per attempt.
    pub multiplier: f64,

    /// Upper bound of the uniform jitter added to each delay, in
    /// milliseconds.
    pub jitter_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds, applied
    /// before jitter.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            multiplier: 2.0,
            jitter_ms: 50,
            max_delay_ms: 2_000,
        }
    }
}
