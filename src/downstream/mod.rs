//! Downstream capability interface.
//!
//! # Responsibilities
//! - Define the contract the orchestrator consumes: a named dependency
//!   that takes a request payload and eventually returns a payload or
//!   an error
//! - Distinguish transient failures from definitive rejections, which
//!   drives the retry predicate
//!
//! # Design Decisions
//! - Capabilities are injected, never constructed here; business logic
//!   (token issuance, ledger updates) stays opaque behind the trait
//! - A capability may be slow or never return; deadline enforcement is
//!   the Call Executor's job, not the capability's

use async_trait::async_trait;
use serde_json::Value;

pub mod stubs;

/// Error reported by a downstream capability itself.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DownstreamError {
    /// The downstream failed in a way that may succeed on retry
    /// (connection reset, 5xx-equivalent, overload).
    #[error("transient downstream failure: {0}")]
    Transient(String),

    /// The downstream definitively rejected the request
    /// (4xx-equivalent). Retrying cannot help.
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl DownstreamError {
    /// Whether a retry could plausibly change the result.
    pub fn is_transient(&self) -> bool {
        matches!(self, DownstreamError::Transient(_))
    }
}

/// A dependent service capability the orchestrator calls.
///
/// Implementations may suspend arbitrarily long; the caller wraps every
/// invocation with a hard deadline and cancels it when the deadline
/// fires.
#[async_trait]
pub trait Downstream: Send + Sync {
    async fn call(&self, request: Value) -> Result<Value, DownstreamError>;
}
