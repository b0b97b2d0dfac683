//! Kitchen API Library
//!
//! A synthetic kitchen service built with Tokio and Axum that demonstrates
//! correlated observability: every simulated order emits a log record, a
//! metric observation, and a trace span sharing one identifying context.

pub mod changes;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod orders;

pub use config::KitchenConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
