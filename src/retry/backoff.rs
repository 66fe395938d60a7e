//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Calculate the deterministic exponential delay for an attempt.
///
/// Delay = `base * multiplier^(attempt - 1)`, capped at `max`. Attempt
/// numbers are 1-based; attempt 0 yields no delay.
pub fn exponential_delay(attempt: u32, base: Duration, multiplier: f64, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = multiplier.powi(attempt.saturating_sub(1) as i32);
    let delay_ms = (base.as_millis() as f64 * factor).round() as u64;
    Duration::from_millis(delay_ms.min(max.as_millis() as u64))
}

/// Add a uniformly-sampled jitter in `[0, jitter_max]` to a delay.
///
/// Jitter is applied after the cap so synchronized callers still spread
/// out even when all of them have hit the maximum delay.
pub fn apply_jitter(delay: Duration, jitter_max: Duration) -> Duration {
    if jitter_max.is_zero() {
        return delay;
    }
    let jitter_ms = rand::thread_rng().gen_range(0..=jitter_max.as_millis() as u64);
    delay + Duration::from_millis(jitter_ms)
}
