//! HTTP service facade.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: timeout, request id, trace)
//!     → handlers.rs
//!         /health  → deployment identity + liveness
//!         /metrics → Prometheus exposition text
//!         /change  → change registry (lenient JSON, never 4xx)
//!         /changes → newest-first bounded timeline
//!         /order   → order journey (simulated latency + signals)
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
