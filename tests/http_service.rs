//! Tests for the thin HTTP layer over the orchestrator.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use switchboard::config::{AppConfig, DownstreamConfig};
use switchboard::downstream::stubs::{AuthStub, PaymentStub};
use switchboard::{HttpServer, Orchestrator, Shutdown};

async fn start_service() -> (String, Shutdown) {
    let mut config = AppConfig::default();
    config.listener.call_deadline_ms = 2_000;
    config.downstreams.push(DownstreamConfig::named("auth"));
    config.downstreams.push(DownstreamConfig::named("payment"));

    let mut orchestrator = Orchestrator::new();
    orchestrator.register(&config.downstreams[0], Arc::new(AuthStub));
    orchestrator.register(&config.downstreams[1], Arc::new(PaymentStub));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, Arc::new(orchestrator));
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (format!("http://{}", addr), shutdown)
}

#[tokio::test]
async fn health_and_readiness() {
    let (url, shutdown) = start_service().await;
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("{url}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let ready: Value = client
        .get(format!("{url}/ready"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ready["ready"], true);

    shutdown.trigger();
}

#[tokio::test]
async fn login_issues_token_and_rejects_empty_username() {
    let (url, shutdown) = start_service().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{url}/login"))
        .json(&json!({ "username": "alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["token"].as_str().unwrap().starts_with("token-alice-"));

    let response = client
        .post(format!("{url}/login"))
        .json(&json!({ "username": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    shutdown.trigger();
}

#[tokio::test]
async fn order_carries_token_from_auth() {
    let (url, shutdown) = start_service().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{url}/order"))
        .json(&json!({ "username": "bob" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["service"], "orders");
    assert!(body["order_id"].as_str().unwrap().starts_with("ORD-"));
    assert!(body["user_token"].as_str().unwrap().starts_with("token-bob-"));

    shutdown.trigger();
}

#[tokio::test]
async fn order_for_rejected_user_is_unauthorized() {
    let (url, shutdown) = start_service().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{url}/order"))
        .json(&json!({ "username": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    shutdown.trigger();
}

#[tokio::test]
async fn payment_round_trip_and_rejection() {
    let (url, shutdown) = start_service().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{url}/pay"))
        .json(&json!({ "amount": 25.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "payment successful");
    assert_eq!(body["amount"], 25.0);

    // A definitive rejection surfaces as a downstream error.
    let response = client
        .post(format!("{url}/pay"))
        .json(&json!({ "amount": -5.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "downstream-error");

    shutdown.trigger();
}

#[tokio::test]
async fn status_reports_breaker_states() {
    let (url, shutdown) = start_service().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{url}/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let breakers = body["breakers"].as_array().unwrap();
    assert_eq!(breakers.len(), 2);
    assert_eq!(breakers[0]["downstream"], "auth");
    assert_eq!(breakers[0]["state"], "closed");
    assert_eq!(breakers[1]["downstream"], "payment");

    shutdown.trigger();
}

#[tokio::test]
async fn responses_carry_request_id() {
    let (url, shutdown) = start_service().await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{url}/health")).send().await.unwrap();
    assert!(response.headers().contains_key(switchboard::http::X_REQUEST_ID));

    let response = client
        .get(format!("{url}/health"))
        .header(switchboard::http::X_REQUEST_ID, "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.headers()[switchboard::http::X_REQUEST_ID],
        "abc-123"
    );

    shutdown.trigger();
}
