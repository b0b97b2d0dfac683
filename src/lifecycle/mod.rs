//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     read env config → init logging → install metrics recorder
//!     → spawn span exporter → bind listener → serve
//!
//! Shutdown (shutdown.rs + signals.rs):
//!     SIGTERM/SIGINT → broadcast shutdown → server drains
//!     → span exporter flushes → process exits
//! ```
//!
//! # Design Decisions
//! - One broadcast channel fans the signal out to every long-running task
//! - The span exporter drains before exit so no telemetry is dropped on the
//!   floor during a deploy

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
