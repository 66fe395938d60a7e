//! Caller-facing endpoint handlers.
//!
//! Typed request/response structs per call site; every downstream call
//! goes through the orchestrator, which owns retries, timeouts, and
//! breaker admission. Handlers only translate the aggregated result
//! into HTTP.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::Instant;
use uuid::Uuid;

use crate::http::server::AppState;
use crate::orchestrator::{FailureKind, OrchestrationError};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub service: &'static str,
    pub order_id: String,
    pub user_token: String,
    pub attempts: u32,
}

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    pub amount: f64,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "switchboard" }))
}

pub async fn ready() -> Json<serde_json::Value> {
    Json(json!({ "ready": true }))
}

/// Breaker state snapshot for operators.
pub async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "service": "switchboard",
        "version": env!("CARGO_PKG_VERSION"),
        "breakers": state.orchestrator.breaker_snapshot(),
    }))
}

pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Response {
    if request.username.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "username required" })),
        )
            .into_response();
    }

    let deadline = Instant::now() + state.call_deadline;
    let payload = json!({ "username": request.username });
    match state.orchestrator.call("auth", payload, deadline).await {
        Ok(result) => (StatusCode::OK, Json(result.payload)).into_response(),
        Err(error) => failure_response(&error),
    }
}

/// Order creation depends on auth: the token must be obtained before an
/// order exists.
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Response {
    let deadline = Instant::now() + state.call_deadline;
    let payload = json!({ "username": request.username });
    let auth = match state.orchestrator.call("auth", payload, deadline).await {
        Ok(result) => result,
        Err(error) if error.kind == FailureKind::DownstreamError => {
            // Auth definitively refused the caller.
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "auth failed", "attempts": error.attempts })),
            )
                .into_response();
        }
        Err(error) => return failure_response(&error),
    };

    let user_token = auth.payload["token"].as_str().unwrap_or_default().to_string();
    let response = OrderResponse {
        service: "orders",
        order_id: format!("ORD-{}", Uuid::new_v4().simple()),
        user_token,
        attempts: auth.attempts,
    };
    (StatusCode::OK, Json(response)).into_response()
}

pub async fn pay(State(state): State<AppState>, Json(request): Json<PayRequest>) -> Response {
    let deadline = Instant::now() + state.call_deadline;
    let payload = json!({ "amount": request.amount });
    match state.orchestrator.call("payment", payload, deadline).await {
        Ok(result) => (StatusCode::OK, Json(result.payload)).into_response(),
        Err(error) => failure_response(&error),
    }
}

/// Map the aggregated failure kind onto an HTTP status, carrying the
/// attempt history for diagnostics.
fn failure_response(error: &OrchestrationError) -> Response {
    let status = match error.kind {
        FailureKind::CircuitOpen | FailureKind::RetriesExhausted => StatusCode::SERVICE_UNAVAILABLE,
        FailureKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        FailureKind::DownstreamError => StatusCode::BAD_GATEWAY,
    };
    let body = json!({
        "error": error.kind,
        "downstream": error.downstream,
        "attempts": error.attempts,
    });
    (status, Json(body)).into_response()
}
