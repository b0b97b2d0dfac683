//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → env.rs (read once at startup, defaults applied)
//!     → KitchenConfig (typed, immutable)
//!     → DeploymentIdentity (derived once, shared via Arc with every signal)
//! ```
//!
//! # Design Decisions
//! - All inputs are environment variables with stated defaults
//! - Configuration is read exactly once; nothing watches for changes
//! - DeploymentIdentity never mutates for the process lifetime

pub mod env;
pub mod schema;

pub use schema::DeploymentIdentity;
pub use schema::KitchenConfig;
pub use schema::ListenerConfig;
pub use schema::LoggingConfig;
