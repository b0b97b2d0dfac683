//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber (stdout + append-only JSON file)
//! - Carry correlated order records through the LogSink seam
//! - Degrade to stdout-only when the log file cannot be opened
//!
//! # Design Decisions
//! - The file stream is JSON for machine parsing; stdout stays human-readable
//! - A missing log directory is created, and failure to do so never aborts
//!   startup

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{DeploymentIdentity, LoggingConfig};

/// Tag on the info-level record emitted for every completed order.
pub const ORDER_OK_TAG: &str = "order_ok";

/// Tag on the warn-level record emitted for every refunded order.
pub const REFUND_TAG: &str = "REFUND_TAG";

/// One correlated log record for a finished order simulation.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub tag: &'static str,
    pub region: String,
    pub prep_time_ms: u64,
    /// Present exactly when the order was refunded; selects warn level.
    pub reason: Option<&'static str>,
    pub recipe_version: String,
    pub change_id: String,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
}

/// Destination for correlated order records.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: OrderRecord);
}

/// Production sink backed by the tracing subscriber.
pub struct TracingLogSink {
    identity: Arc<DeploymentIdentity>,
}

impl TracingLogSink {
    pub fn new(identity: Arc<DeploymentIdentity>) -> Self {
        Self { identity }
    }
}

impl LogSink for TracingLogSink {
    fn emit(&self, r: OrderRecord) {
        // tracing metadata is static per call site, so refund/ok branch here.
        match r.reason {
            Some(reason) => tracing::warn!(
                tag = r.tag,
                region = %r.region,
                prep_time_ms = r.prep_time_ms,
                reason,
                recipe_version = %r.recipe_version,
                change_id = %r.change_id,
                service = %self.identity.service,
                env = %self.identity.env,
                owner = %self.identity.owner,
                version = %self.identity.version,
                trace_id = r.trace_id.as_deref(),
                span_id = r.span_id.as_deref(),
                "{}",
                r.tag
            ),
            None => tracing::info!(
                tag = r.tag,
                region = %r.region,
                prep_time_ms = r.prep_time_ms,
                recipe_version = %r.recipe_version,
                change_id = %r.change_id,
                service = %self.identity.service,
                env = %self.identity.env,
                owner = %self.identity.owner,
                version = %self.identity.version,
                trace_id = r.trace_id.as_deref(),
                span_id = r.span_id.as_deref(),
                "{}",
                r.tag
            ),
        }
    }
}

/// Initialize the global subscriber: stdout always, plus a JSON layer
/// appending to `config.file` when the file can be opened.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let (file_layer, file_error) = match open_log_file(&config.file) {
        Ok(file) => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(Arc::new(file));
            (Some(layer), None)
        }
        Err(err) => (None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    if let Some(err) = file_error {
        tracing::warn!(
            log_file = %config.file,
            error = %err,
            "could not open log file; logging to stdout only"
        );
    }
}

/// Open the append-only log file, creating its directory as needed.
pub fn open_log_file(path: &str) -> std::io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
