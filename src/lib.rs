//! Switchboard: a service-to-service request orchestrator.
//!
//! Implements bounded-retry, timeout, and circuit-breaking semantics
//! for chains of dependent calls (orders depends on auth; payment is an
//! unreliable downstream).
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌────────────────────────────────────────────┐
//!                  │               SWITCHBOARD                  │
//!                  │                                            │
//!  Caller Request  │  ┌──────┐   ┌──────────────┐   ┌────────┐  │
//!  ────────────────┼─▶│ http │──▶│ orchestrator │──▶│breaker │  │
//!                  │  └──────┘   └──────┬───────┘   └────┬───┘  │
//!                  │                    │  admitted      │      │
//!                  │                    ▼                │      │
//!                  │             ┌──────────┐   outcome  │      │
//!                  │             │ executor │────────────┘      │
//!                  │             └────┬─────┘                   │
//!                  │                  ▼                         │
//!                  │           ┌────────────┐   ┌───────────┐   │
//!                  │           │ downstream │   │   retry   │   │
//!                  │           │ capability │   │  policy   │   │
//!                  │           └────────────┘   └───────────┘   │
//!                  │                                            │
//!                  │  cross-cutting: config, observability,     │
//!                  │                 lifecycle                  │
//!                  └────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod breaker;
pub mod config;
pub mod downstream;
pub mod executor;
pub mod orchestrator;
pub mod retry;

// Caller-facing surface
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use orchestrator::{FailureKind, Orchestrated, Orchestrator};
