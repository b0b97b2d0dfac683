//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! One simulated order produces three correlated signals:
//!     → logging.rs (order_ok / REFUND_TAG records, stdout + JSON file)
//!     → metrics.rs (prep-time histogram, refund counter, /metrics scrape)
//!     → trace.rs   (order_journey span, batched export to the collector)
//!
//! All three carry the same region, recipe version, change id, and
//! trace/span ids; that correlation is the point of the service.
//! ```
//!
//! # Design Decisions
//! - Each signal sits behind a small trait so the correlator can be tested
//!   against in-memory doubles
//! - A failure anywhere in this subsystem degrades the signal, never the
//!   request that produced it

pub mod logging;
pub mod metrics;
pub mod trace;

pub use logging::{LogSink, OrderRecord, TracingLogSink};
pub use metrics::{MetricsSink, PrometheusSink};
pub use trace::{CorrelationContext, SpanExporter, SpanGuard, SpanOutcome, TraceSink};
