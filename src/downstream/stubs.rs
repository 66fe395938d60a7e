//! In-process downstream capabilities for the demo deployment.
//!
//! These stand in for the real auth and payment services behind the
//! [`Downstream`](super::Downstream) trait. They are deterministic;
//! failure and latency simulation belongs in test fakes, not here.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::downstream::{Downstream, DownstreamError};

#[derive(Deserialize)]
struct AuthRequest {
    username: String,
}

#[derive(Deserialize)]
struct PaymentRequest {
    amount: f64,
}

/// Token-issuing auth capability.
pub struct AuthStub;

#[async_trait]
impl Downstream for AuthStub {
    async fn call(&self, request: Value) -> Result<Value, DownstreamError> {
        let request: AuthRequest = serde_json::from_value(request)
            .map_err(|e| DownstreamError::Rejected(format!("invalid auth request: {e}")))?;

        if request.username.is_empty() {
            return Err(DownstreamError::Rejected("username required".into()));
        }

        let issued_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Ok(json!({
            "service": "auth",
            "token": format!("token-{}-{}", request.username, issued_at),
        }))
    }
}

/// Payment-processing capability.
pub struct PaymentStub;

#[async_trait]
impl Downstream for PaymentStub {
    async fn call(&self, request: Value) -> Result<Value, DownstreamError> {
        let request: PaymentRequest = serde_json::from_value(request)
            .map_err(|e| DownstreamError::Rejected(format!("invalid payment request: {e}")))?;

        if request.amount <= 0.0 {
            return Err(DownstreamError::Rejected("amount must be positive".into()));
        }

        Ok(json!({
            "service": "payment",
            "status": "payment successful",
            "amount": request.amount,
        }))
    }
}
