//! Trace spans and export.
//!
//! # Responsibilities
//! - Open an identifying span per simulated order and close it exactly once
//! - Expose trace/span ids so logs can be correlated with spans
//! - Batch finished spans to the configured collector endpoint
//!
//! # Design Decisions
//! - SpanGuard finishes the span on drop, so cancellation mid-request still
//!   closes it with a Cancelled outcome
//! - Export is fire-and-forget over an unbounded channel; a dead collector
//!   costs a debug log, never a failed order
//! - Ids are 32/16 hex chars to match what trace tooling expects

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::DeploymentIdentity;

/// Span name for the order simulation operation.
pub const ORDER_SPAN: &str = "order_journey";

const EXPORT_BATCH_SIZE: usize = 32;
const EXPORT_INTERVAL: Duration = Duration::from_secs(3);

/// Identifying fields shared by every signal of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrelationContext {
    pub trace_id: String,
    pub span_id: String,
}

/// Terminal state of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanOutcome {
    Ok,
    Error,
    Cancelled,
}

impl SpanOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanOutcome::Ok => "ok",
            SpanOutcome::Error => "error",
            SpanOutcome::Cancelled => "cancelled",
        }
    }
}

/// An open span. Created by a TraceSink, finished exactly once.
#[derive(Debug)]
pub struct ActiveSpan {
    pub name: &'static str,
    pub region: String,
    pub context: CorrelationContext,
    pub started: Instant,
}

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("trace pipeline unavailable")]
    Unavailable,
}

/// Destination for span lifecycle events.
pub trait TraceSink: Send + Sync {
    fn start_span(&self, name: &'static str, region: &str) -> Result<ActiveSpan, TraceError>;
    fn finish_span(&self, span: ActiveSpan, outcome: SpanOutcome);
}

/// Scoped span ownership: whatever exit path the request takes, the span is
/// finished exactly once. An unfinished guard reports Cancelled on drop.
pub struct SpanGuard {
    sink: Arc<dyn TraceSink>,
    span: Option<ActiveSpan>,
}

impl SpanGuard {
    /// Start a span, degrading to a no-op guard when the sink is down.
    ///
    /// The degradation is observable (a warning) but never aborts the
    /// request that asked for the span.
    pub fn start(sink: Arc<dyn TraceSink>, name: &'static str, region: &str) -> Self {
        let span = match sink.start_span(name, region) {
            Ok(span) => Some(span),
            Err(err) => {
                tracing::warn!(
                    span = name,
                    region,
                    error = %err,
                    "failed to start span; continuing without trace context"
                );
                None
            }
        };
        Self { sink, span }
    }

    /// Trace/span ids for log correlation, when the span opened.
    pub fn correlation(&self) -> Option<CorrelationContext> {
        self.span.as_ref().map(|s| s.context.clone())
    }

    pub fn finish(&mut self, outcome: SpanOutcome) {
        if let Some(span) = self.span.take() {
            self.sink.finish_span(span, outcome);
        }
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if let Some(span) = self.span.take() {
            self.sink.finish_span(span, SpanOutcome::Cancelled);
        }
    }
}

/// A finished span as shipped to the collector.
#[derive(Debug, Clone, Serialize)]
struct ExportedSpan {
    name: &'static str,
    trace_id: String,
    span_id: String,
    region: String,
    outcome: &'static str,
    duration_ms: u64,
    ended_at: DateTime<Utc>,
}

/// Production trace sink: mints ids and queues finished spans for export.
pub struct SpanExporter {
    tx: mpsc::UnboundedSender<ExportedSpan>,
}

impl SpanExporter {
    /// Spawn the background export task and return the sink plus a task
    /// handle that shutdown waits on.
    pub fn spawn(
        endpoint: &str,
        identity: Arc<DeploymentIdentity>,
    ) -> (Arc<Self>, SpanExporterTask) {
        let (tx, rx) = mpsc::unbounded_channel();
        let url = format!("{}/v1/traces", endpoint.trim_end_matches('/'));
        let handle = tokio::spawn(run_exporter(rx, url, identity));
        (Arc::new(Self { tx }), SpanExporterTask { handle })
    }
}

impl TraceSink for SpanExporter {
    fn start_span(&self, name: &'static str, region: &str) -> Result<ActiveSpan, TraceError> {
        if self.tx.is_closed() {
            return Err(TraceError::Unavailable);
        }
        Ok(ActiveSpan {
            name,
            region: region.to_string(),
            context: CorrelationContext {
                trace_id: Uuid::new_v4().simple().to_string(),
                span_id: format!("{:016x}", rand::thread_rng().gen::<u64>()),
            },
            started: Instant::now(),
        })
    }

    fn finish_span(&self, span: ActiveSpan, outcome: SpanOutcome) {
        let exported = ExportedSpan {
            name: span.name,
            trace_id: span.context.trace_id,
            span_id: span.context.span_id,
            region: span.region,
            outcome: outcome.as_str(),
            duration_ms: span.started.elapsed().as_millis() as u64,
            ended_at: Utc::now(),
        };
        tracing::debug!(
            trace_id = %exported.trace_id,
            span_id = %exported.span_id,
            span = exported.name,
            outcome = exported.outcome,
            duration_ms = exported.duration_ms,
            "span finished"
        );
        if self.tx.send(exported).is_err() {
            tracing::debug!("span exporter stopped; dropping span");
        }
    }
}

/// Handle on the background export task.
pub struct SpanExporterTask {
    handle: JoinHandle<()>,
}

impl SpanExporterTask {
    /// Wait for the exporter to drain its queue. The channel closes once all
    /// sink handles are dropped; a deadline bounds how long shutdown blocks.
    pub async fn shutdown(self, deadline: Duration) {
        if tokio::time::timeout(deadline, self.handle).await.is_err() {
            tracing::warn!("span exporter did not drain before deadline");
        }
    }
}

async fn run_exporter(
    mut rx: mpsc::UnboundedReceiver<ExportedSpan>,
    url: String,
    identity: Arc<DeploymentIdentity>,
) {
    let client = reqwest::Client::new();
    let resource = serde_json::json!({
        "service.name": identity.service,
        "deployment.environment": identity.env,
        "service.version": identity.version,
        "change_id": identity.change_id,
        "owner": identity.owner,
    });

    let mut batch: Vec<ExportedSpan> = Vec::new();
    let mut ticker = tokio::time::interval(EXPORT_INTERVAL);
    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(span) => {
                    batch.push(span);
                    if batch.len() >= EXPORT_BATCH_SIZE {
                        flush(&client, &url, &resource, &mut batch).await;
                    }
                }
                // All senders dropped: final flush, then exit.
                None => {
                    flush(&client, &url, &resource, &mut batch).await;
                    break;
                }
            },
            _ = ticker.tick() => {
                flush(&client, &url, &resource, &mut batch).await;
            }
        }
    }
}

async fn flush(
    client: &reqwest::Client,
    url: &str,
    resource: &serde_json::Value,
    batch: &mut Vec<ExportedSpan>,
) {
    if batch.is_empty() {
        return;
    }
    let body = serde_json::json!({
        "resource": resource,
        "spans": batch,
    });
    match client.post(url).json(&body).send().await {
        Ok(resp) if !resp.status().is_success() => {
            tracing::warn!(status = %resp.status(), spans = batch.len(), "span export rejected");
        }
        Ok(_) => {}
        Err(err) => {
            tracing::debug!(error = %err, spans = batch.len(), "span export failed; collector offline?");
        }
    }
    batch.clear();
}
