//! Retry subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt outcome from the executor:
//!     → policy.rs (retryable? attempts remaining?)
//!     → backoff.rs (exponential delay + jitter, capped)
//!     → Orchestrator sleeps, then loops
//! ```
//!
//! # Design Decisions
//! - Retries only outcomes the predicate marks transient; definitive
//!   rejections stop immediately
//! - Jittered backoff prevents synchronized retry storms
//! - The policy is pure; sleeping happens in the Orchestrator, never
//!   while holding the breaker lock

pub mod backoff;
pub mod policy;

pub use policy::RetryPolicy;
