use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use switchboard::config::{load_config, AppConfig, DownstreamConfig};
use switchboard::downstream::stubs::{AuthStub, PaymentStub};
use switchboard::downstream::Downstream;
use switchboard::observability::{logging, metrics};
use switchboard::{HttpServer, Orchestrator, Shutdown};

#[derive(Parser)]
#[command(name = "switchboard")]
#[command(about = "Service-to-service request orchestrator", long_about = None)]
struct Args {
    /// Path to a TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if config.downstreams.is_empty() {
        config.downstreams.push(DownstreamConfig::named("auth"));
        config.downstreams.push(DownstreamConfig::named("payment"));
    }

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        call_deadline_ms = config.listener.call_deadline_ms,
        downstreams = config.downstreams.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut orchestrator = Orchestrator::new();
    for downstream in &config.downstreams {
        let capability: Arc<dyn Downstream> = match downstream.name.as_str() {
            "auth" => Arc::new(AuthStub),
            "payment" => Arc::new(PaymentStub),
            other => {
                tracing::warn!(downstream = %other, "No capability wired for downstream, skipping");
                continue;
            }
        };
        orchestrator.register(downstream, capability);
    }
    let orchestrator = Arc::new(orchestrator);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.trigger();
        }
    });

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, orchestrator);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
