//! Order simulation subsystem.
//!
//! # Data Flow
//! ```text
//! GET /order?region=...
//!     → journey.rs (open span, derive correlation context)
//!     → outcome.rs (pure latency/refund computation)
//!     → tokio sleep for the computed latency (the only suspension point)
//!     → metrics sink (histogram observation, refund counter)
//!     → log sink (order_ok / REFUND_TAG record with trace ids)
//!     → span closed on every exit path
//! ```
//!
//! # Design Decisions
//! - The outcome computation is pure; all side effects live in journey.rs
//! - Randomness sits behind RandomSource so tests can script every branch
//! - Span closure is a drop guard, so cancellation cannot leak a span

pub mod journey;
pub mod outcome;

pub use journey::{JourneyError, OrderJourney, OrderReceipt};
pub use outcome::{simulate, RandomSource, RefundReason, SimulationResult, ThreadRandom};
