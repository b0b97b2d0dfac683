//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;

use kitchen_api::changes::ChangeRegistry;
use kitchen_api::config::DeploymentIdentity;
use kitchen_api::http::{AppState, HttpServer};
use kitchen_api::lifecycle::Shutdown;
use kitchen_api::observability::logging::TracingLogSink;
use kitchen_api::observability::metrics::{install_recorder, PrometheusSink};
use kitchen_api::observability::trace::SpanExporter;
use kitchen_api::orders::{OrderJourney, ThreadRandom};

static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

/// The Prometheus recorder is process-global; install it once and share the
/// handle across every test in the binary.
pub fn prometheus_handle() -> PrometheusHandle {
    RECORDER
        .get_or_init(|| install_recorder().expect("install Prometheus recorder"))
        .clone()
}

/// Start a full server on an ephemeral port with default identity.
///
/// The span exporter points at a dead port; export failures degrade to debug
/// logs, which is part of what these tests exercise.
pub async fn spawn_app(failure_rate: f64) -> (SocketAddr, Shutdown) {
    let identity = Arc::new(DeploymentIdentity::default());
    let (trace_sink, _exporter) = SpanExporter::spawn("http://127.0.0.1:9", Arc::clone(&identity));

    let state = AppState {
        identity: Arc::clone(&identity),
        changes: Arc::new(ChangeRegistry::new(Arc::clone(&identity))),
        journey: Arc::new(OrderJourney::new(
            Arc::clone(&identity),
            identity.version.clone(),
            failure_rate,
            Arc::new(PrometheusSink),
            Arc::new(TracingLogSink::new(Arc::clone(&identity))),
            trace_sink,
            Arc::new(ThreadRandom),
        )),
        prometheus: prometheus_handle(),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = HttpServer::new(state).run(listener, rx).await;
    });

    (addr, shutdown)
}
