//! Retry decision policy.
//!
//! Decides, given an outcome and attempt count, whether another attempt
//! is permitted and after what delay. Timeouts and transient downstream
//! failures are retryable; definitive rejections never are.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::executor::CallOutcome;
use crate::retry::backoff;

/// Immutable retry policy for one call site, built once at orchestrator
/// construction.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    multiplier: f64,
    jitter_max: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            multiplier: config.multiplier,
            jitter_max: Duration::from_millis(config.jitter_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether this outcome could plausibly change on retry.
    pub fn is_retryable(&self, outcome: &CallOutcome) -> bool {
        match outcome {
            CallOutcome::Success(_) => false,
            CallOutcome::Timeout => true,
            CallOutcome::Failure(error) => error.is_transient(),
        }
    }

    /// Whether another attempt is permitted after `attempt` produced
    /// `outcome`.
    pub fn should_retry(&self, attempt: u32, outcome: &CallOutcome) -> bool {
        attempt < self.max_attempts && self.is_retryable(outcome)
    }

    /// Delay to wait before the attempt following `attempt`.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let delay =
            backoff::exponential_delay(attempt, self.base_delay, self.multiplier, self.max_delay);
        backoff::apply_jitter(delay, self.jitter_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downstream::DownstreamError;

    fn policy() -> RetryPolicy {
        RetryPolicy::from_config(&RetryConfig {
            max_attempts: 3,
            base_delay_ms: 100,
            multiplier: 2.0,
            jitter_ms: 50,
            max_delay_ms: 2000,
        })
    }

    #[test]
    fn retries_timeouts_and_transient_failures() {
        let policy = policy();
        assert!(policy.should_retry(1, &CallOutcome::Timeout));
        let transient = CallOutcome::Failure(DownstreamError::Transient("reset".into()));
        assert!(policy.should_retry(2, &transient));
    }

    #[test]
    fn never_retries_rejections() {
        let policy = policy();
        let rejected = CallOutcome::Failure(DownstreamError::Rejected("bad request".into()));
        assert!(!policy.should_retry(1, &rejected));
    }

    #[test]
    fn stops_at_max_attempts() {
        let policy = policy();
        assert!(policy.should_retry(2, &CallOutcome::Timeout));
        assert!(!policy.should_retry(3, &CallOutcome::Timeout));
    }

    #[test]
    fn delay_within_documented_bounds() {
        let policy = policy();
        for attempt in 1..=3 {
            let floor = 100u64 * 2u64.pow(attempt - 1);
            for _ in 0..50 {
                let delay = policy.next_delay(attempt).as_millis() as u64;
                assert!(delay >= floor, "attempt {attempt}: {delay} < {floor}");
                assert!(delay <= floor + 50, "attempt {attempt}: {delay} > {}", floor + 50);
            }
        }
    }
}
