//! Per-downstream breaker registry.
//!
//! Breakers for different downstreams are fully independent; the map is
//! sharded so looking one up never contends on another downstream's
//! lock.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use crate::breaker::{BreakerState, CircuitBreaker};
use crate::config::BreakerConfig;

/// All circuit breakers, keyed by downstream name.
#[derive(Default)]
pub struct BreakerRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

/// Snapshot of one breaker for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerStatus {
    pub downstream: String,
    pub state: BreakerState,
    pub consecutive_failures: u32,
}

impl BreakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a breaker for a downstream.
    pub fn register(&self, name: &str, config: &BreakerConfig) -> Arc<CircuitBreaker> {
        let breaker = Arc::new(CircuitBreaker::new(name, config));
        self.breakers.insert(name.to_string(), breaker.clone());
        breaker
    }

    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|entry| entry.clone())
    }

    /// Point-in-time view of every breaker, sorted by name.
    pub fn snapshot(&self) -> Vec<BreakerStatus> {
        let mut statuses: Vec<BreakerStatus> = self
            .breakers
            .iter()
            .map(|entry| BreakerStatus {
                downstream: entry.key().clone(),
                state: entry.value().state(),
                consecutive_failures: entry.value().consecutive_failures(),
            })
            .collect();
        statuses.sort_by(|a, b| a.downstream.cmp(&b.downstream));
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registers_independent_breakers() {
        let registry = BreakerRegistry::new();
        let config = BreakerConfig {
            failure_threshold: 1,
            cooldown_ms: 60_000,
            half_open_max_trials: 1,
        };
        let auth = registry.register("auth", &config);
        registry.register("payment", &config);

        auth.try_acquire().unwrap().record_failure();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].downstream, "auth");
        assert_eq!(snapshot[0].state, BreakerState::Open);
        assert_eq!(snapshot[1].downstream, "payment");
        assert_eq!(snapshot[1].state, BreakerState::Closed);
    }
}
