//! Kitchen API
//!
//! A synthetic "kitchen" service for observability labs, built with Tokio and
//! Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 KITCHEN API                   │
//!                       │                                               │
//!   GET /order ─────────┼─▶ http ──▶ orders::journey ──▶ orders::outcome│
//!                       │               │    (sleep = simulated work)   │
//!                       │               ▼                               │
//!                       │   ┌───────────────────────────────┐           │
//!                       │   │  correlated signals            │           │
//!                       │   │  logs ── metrics ── trace span │           │
//!                       │   └───────────────────────────────┘           │
//!                       │                                               │
//!   POST /change ───────┼─▶ changes::timeline (bounded, newest-first)   │
//!   GET /health,/metrics┼─▶ http::handlers                              │
//!                       │                                               │
//!                       │  cross-cutting: config (env), lifecycle,      │
//!                       │  observability (logging/metrics/trace)        │
//!                       └──────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use kitchen_api::changes::ChangeRegistry;
use kitchen_api::config::KitchenConfig;
use kitchen_api::http::{AppState, HttpServer};
use kitchen_api::lifecycle::{wait_for_signal, Shutdown};
use kitchen_api::observability::logging::TracingLogSink;
use kitchen_api::observability::metrics::PrometheusSink;
use kitchen_api::observability::trace::SpanExporter;
use kitchen_api::observability::{logging, metrics};
use kitchen_api::orders::{OrderJourney, ThreadRandom};

const EXPORTER_DRAIN_DEADLINE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = KitchenConfig::from_env();
    logging::init(&config.logging);

    let identity = Arc::new(config.identity.clone());
    tracing::info!(
        service = %identity.service,
        env = %identity.env,
        owner = %identity.owner,
        version = %identity.version,
        change_id = %identity.change_id,
        port = config.listener.port,
        log_file = %config.logging.file,
        recipe_version = %config.simulation.recipe_version,
        "kitchen-api starting"
    );

    let prometheus = metrics::install_recorder()?;
    let (trace_sink, exporter) = SpanExporter::spawn(
        &config.telemetry.exporter_endpoint,
        Arc::clone(&identity),
    );

    let state = AppState {
        identity: Arc::clone(&identity),
        changes: Arc::new(ChangeRegistry::new(Arc::clone(&identity))),
        journey: Arc::new(OrderJourney::new(
            Arc::clone(&identity),
            config.simulation.recipe_version.clone(),
            config.simulation.failure_rate,
            Arc::new(PrometheusSink),
            Arc::new(TracingLogSink::new(Arc::clone(&identity))),
            trace_sink,
            Arc::new(ThreadRandom),
        )),
        prometheus,
    };

    let listener = TcpListener::bind(("0.0.0.0", config.listener.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    let server = HttpServer::new(state);
    server.run(listener, shutdown.subscribe()).await?;

    // The server (and with it the last trace sink handle) is gone; wait for
    // the exporter to flush whatever is still queued.
    exporter.shutdown(EXPORTER_DRAIN_DEADLINE).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
