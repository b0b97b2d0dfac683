//! The telemetry-correlated order journey.
//!
//! # Responsibilities
//! - Run one simulated order end to end: span, outcome, delay, signals
//! - Guarantee that the histogram observation, the log record, and the span
//!   for one order all carry the same region, recipe version, change id, and
//!   trace/span ids
//! - Close the span on every exit path, including cancellation
//!
//! # Design Decisions
//! - The latency wait is the single suspension point and uses tokio's timer,
//!   so dropping the request future cancels it cleanly
//! - Missing trace context downgrades the log record, never the request

use std::sync::Arc;
use std::time::Duration;

use crate::config::DeploymentIdentity;
use crate::observability::logging::{LogSink, OrderRecord, ORDER_OK_TAG, REFUND_TAG};
use crate::observability::metrics::MetricsSink;
use crate::observability::trace::{CorrelationContext, SpanGuard, SpanOutcome, TraceSink, ORDER_SPAN};
use crate::orders::outcome::{simulate, RandomSource};

/// Successful order response payload.
#[derive(Debug, Clone)]
pub struct OrderReceipt {
    pub region: String,
    pub prep_time_ms: u64,
    pub refunded: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum JourneyError {
    /// Raised by the failure-injection knob to exercise error paths.
    #[error("injected order failure")]
    Injected,
}

/// Orchestrates one simulated order and its three correlated signals.
pub struct OrderJourney {
    identity: Arc<DeploymentIdentity>,
    recipe_version: String,
    failure_rate: f64,
    metrics: Arc<dyn MetricsSink>,
    logs: Arc<dyn LogSink>,
    traces: Arc<dyn TraceSink>,
    rng: Arc<dyn RandomSource>,
}

impl OrderJourney {
    pub fn new(
        identity: Arc<DeploymentIdentity>,
        recipe_version: String,
        failure_rate: f64,
        metrics: Arc<dyn MetricsSink>,
        logs: Arc<dyn LogSink>,
        traces: Arc<dyn TraceSink>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            identity,
            recipe_version,
            failure_rate,
            metrics,
            logs,
            traces,
            rng,
        }
    }

    /// Simulate one order for `region`.
    ///
    /// Opens the order_journey span, computes the outcome, sleeps for the
    /// computed latency, then records the histogram observation and the
    /// correlated log record (plus the refund counter when refunded). The
    /// span closes exactly once whether this returns Ok, returns Err, or is
    /// cancelled mid-sleep.
    pub async fn handle_order(&self, region: &str) -> Result<OrderReceipt, JourneyError> {
        let mut span = SpanGuard::start(Arc::clone(&self.traces), ORDER_SPAN, region);
        let correlation = span.correlation();

        match self.run(region, &correlation).await {
            Ok(receipt) => {
                span.finish(SpanOutcome::Ok);
                Ok(receipt)
            }
            Err(err) => {
                tracing::error!(
                    region,
                    change_id = %self.identity.change_id,
                    error = %err,
                    "order_failed"
                );
                span.finish(SpanOutcome::Error);
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        region: &str,
        correlation: &Option<CorrelationContext>,
    ) -> Result<OrderReceipt, JourneyError> {
        if self.failure_rate > 0.0 && self.rng.next_unit() < self.failure_rate {
            return Err(JourneyError::Injected);
        }

        let outcome = simulate(region, &self.recipe_version, self.rng.as_ref());

        // The simulated work. Cancellable: dropping this future mid-sleep
        // routes through the span guard's drop path.
        tokio::time::sleep(Duration::from_millis(outcome.prep_time_ms)).await;

        self.metrics.observe_prep_time(
            region,
            &self.recipe_version,
            &self.identity.change_id,
            outcome.prep_time_ms,
        );
        if outcome.refunded {
            self.metrics.record_refund(
                region,
                outcome.reason.as_str(),
                &self.identity.change_id,
            );
        }

        let (trace_id, span_id) = match correlation {
            Some(ctx) => (Some(ctx.trace_id.clone()), Some(ctx.span_id.clone())),
            None => (None, None),
        };
        self.logs.emit(OrderRecord {
            tag: if outcome.refunded { REFUND_TAG } else { ORDER_OK_TAG },
            region: region.to_string(),
            prep_time_ms: outcome.prep_time_ms,
            reason: outcome.refunded.then(|| outcome.reason.as_str()),
            recipe_version: self.recipe_version.clone(),
            change_id: self.identity.change_id.clone(),
            trace_id,
            span_id,
        });

        Ok(OrderReceipt {
            region: region.to_string(),
            prep_time_ms: outcome.prep_time_ms,
            refunded: outcome.refunded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::trace::{ActiveSpan, CorrelationContext, TraceError};
    use crate::orders::outcome::ScriptedRandom;
    use std::sync::Mutex;
    use std::time::Instant;

    const ZERO_JITTER: f64 = 20.0 / 60.0;
    const NO_REFUND: f64 = 0.99;

    #[derive(Default)]
    struct RecordingMetrics {
        observations: Mutex<Vec<(String, String, String, u64)>>,
        refunds: Mutex<Vec<(String, String, String)>>,
    }

    impl MetricsSink for RecordingMetrics {
        fn observe_prep_time(&self, region: &str, recipe_version: &str, change_id: &str, ms: u64) {
            self.observations.lock().unwrap().push((
                region.into(),
                recipe_version.into(),
                change_id.into(),
                ms,
            ));
        }

        fn record_refund(&self, region: &str, reason: &str, change_id: &str) {
            self.refunds
                .lock()
                .unwrap()
                .push((region.into(), reason.into(), change_id.into()));
        }
    }

    #[derive(Default)]
    struct RecordingLogs {
        records: Mutex<Vec<OrderRecord>>,
    }

    impl LogSink for RecordingLogs {
        fn emit(&self, record: OrderRecord) {
            self.records.lock().unwrap().push(record);
        }
    }

    #[derive(Default)]
    struct RecordingTraces {
        started: Mutex<usize>,
        finished: Mutex<Vec<SpanOutcome>>,
        fail_start: bool,
    }

    impl TraceSink for RecordingTraces {
        fn start_span(&self, name: &'static str, region: &str) -> Result<ActiveSpan, TraceError> {
            if self.fail_start {
                return Err(TraceError::Unavailable);
            }
            *self.started.lock().unwrap() += 1;
            Ok(ActiveSpan {
                name,
                region: region.to_string(),
                context: CorrelationContext {
                    trace_id: "0123456789abcdef0123456789abcdef".to_string(),
                    span_id: "0123456789abcdef".to_string(),
                },
                started: Instant::now(),
            })
        }

        fn finish_span(&self, _span: ActiveSpan, outcome: SpanOutcome) {
            self.finished.lock().unwrap().push(outcome);
        }
    }

    struct Harness {
        metrics: Arc<RecordingMetrics>,
        logs: Arc<RecordingLogs>,
        traces: Arc<RecordingTraces>,
        journey: OrderJourney,
    }

    fn harness(recipe_version: &str, failure_rate: f64, draws: &[f64]) -> Harness {
        let metrics = Arc::new(RecordingMetrics::default());
        let logs = Arc::new(RecordingLogs::default());
        let traces = Arc::new(RecordingTraces::default());
        let journey = OrderJourney::new(
            Arc::new(DeploymentIdentity::default()),
            recipe_version.to_string(),
            failure_rate,
            metrics.clone(),
            logs.clone(),
            traces.clone(),
            Arc::new(ScriptedRandom::new(draws)),
        );
        Harness {
            metrics,
            logs,
            traces,
            journey,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn successful_order_emits_correlated_ok_signals() {
        let h = harness("v1.0", 0.0, &[ZERO_JITTER, NO_REFUND]);
        let receipt = h.journey.handle_order("west").await.unwrap();
        assert_eq!(receipt.region, "west");
        assert_eq!(receipt.prep_time_ms, 90);
        assert!(!receipt.refunded);

        let observations = h.metrics.observations.lock().unwrap();
        assert_eq!(
            *observations,
            vec![("west".into(), "v1.0".into(), "none".into(), 90)]
        );
        assert!(h.metrics.refunds.lock().unwrap().is_empty());

        let records = h.logs.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.tag, ORDER_OK_TAG);
        assert_eq!(record.reason, None);
        assert_eq!(record.region, "west");
        assert_eq!(record.prep_time_ms, 90);
        assert_eq!(record.change_id, "none");
        assert_eq!(
            record.trace_id.as_deref(),
            Some("0123456789abcdef0123456789abcdef")
        );
        assert_eq!(record.span_id.as_deref(), Some("0123456789abcdef"));

        assert_eq!(*h.traces.finished.lock().unwrap(), vec![SpanOutcome::Ok]);
    }

    #[tokio::test(start_paused = true)]
    async fn refunded_order_emits_warning_and_counter() {
        let h = harness("v1.4", 0.0, &[ZERO_JITTER, 0.1]);
        let receipt = h.journey.handle_order("east").await.unwrap();
        assert!(receipt.refunded);
        assert_eq!(receipt.prep_time_ms, 400);

        let refunds = h.metrics.refunds.lock().unwrap();
        assert_eq!(
            *refunds,
            vec![("east".into(), "undercooked_chicken".into(), "none".into())]
        );

        let records = h.logs.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tag, REFUND_TAG);
        assert_eq!(records[0].reason, Some("undercooked_chicken"));
        assert_eq!(records[0].change_id, "none");
        assert_eq!(records[0].region, "east");
    }

    #[tokio::test(start_paused = true)]
    async fn trace_enrichment_failure_degrades_but_completes() {
        let metrics = Arc::new(RecordingMetrics::default());
        let logs = Arc::new(RecordingLogs::default());
        let traces = Arc::new(RecordingTraces {
            fail_start: true,
            ..Default::default()
        });
        let journey = OrderJourney::new(
            Arc::new(DeploymentIdentity::default()),
            "v1.0".to_string(),
            0.0,
            metrics.clone(),
            logs.clone(),
            traces.clone(),
            Arc::new(ScriptedRandom::new(&[ZERO_JITTER, NO_REFUND])),
        );

        let receipt = journey.handle_order("west").await.unwrap();
        assert_eq!(receipt.region, "west");

        let records = logs.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].trace_id, None);
        assert_eq!(records[0].span_id, None);
        assert!(traces.finished.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn injected_failure_closes_span_with_error() {
        // failure draw comes first and 0.0 < 1.0 always fails
        let h = harness("v1.0", 1.0, &[0.0]);
        let result = h.journey.handle_order("west").await;
        assert!(matches!(result, Err(JourneyError::Injected)));

        assert!(h.metrics.observations.lock().unwrap().is_empty());
        assert!(h.logs.records.lock().unwrap().is_empty());
        assert_eq!(*h.traces.finished.lock().unwrap(), vec![SpanOutcome::Error]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_order_still_closes_span() {
        let h = harness("v1.0", 0.0, &[ZERO_JITTER, NO_REFUND]);
        let cancelled = tokio::time::timeout(
            Duration::from_millis(10),
            h.journey.handle_order("west"),
        )
        .await;
        assert!(cancelled.is_err(), "order should be cancelled mid-sleep");

        assert_eq!(*h.traces.started.lock().unwrap(), 1);
        assert_eq!(
            *h.traces.finished.lock().unwrap(),
            vec![SpanOutcome::Cancelled]
        );
        assert!(h.metrics.observations.lock().unwrap().is_empty());
        assert!(h.logs.records.lock().unwrap().is_empty());
    }
}
