//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve with graceful shutdown
//!
//! The server is deliberately thin: all reliability logic lives in the
//! orchestrator it wraps.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::{handlers, request};
use crate::orchestrator::Orchestrator;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Overall deadline applied to each orchestrated call.
    pub call_deadline: Duration,
}

/// Caller-facing HTTP server.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around an orchestrator.
    pub fn new(config: &AppConfig, orchestrator: Arc<Orchestrator>) -> Self {
        let call_deadline = Duration::from_millis(config.listener.call_deadline_ms);
        let state = AppState {
            orchestrator,
            call_deadline,
        };

        // Give the outer request timeout headroom over the orchestrator's
        // own deadline so callers see the tagged failure, not a raw 408.
        let request_timeout = call_deadline + Duration::from_secs(1);

        let router = Router::new()
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            .route("/status", get(handlers::status))
            .route("/login", post(handlers::login))
            .route("/order", post(handlers::create_order))
            .route("/pay", post(handlers::pay))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(axum::middleware::from_fn(request::propagate_request_id))
            .layer(TraceLayer::new_for_http());

        Self { router }
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
