//! Deployment change tracking subsystem.
//!
//! # Data Flow
//! ```text
//! POST /change (loose JSON)
//!     → timeline.rs (coerce fields, default from DeploymentIdentity)
//!     → bounded in-memory timeline (newest 50 retained)
//!     → CHANGE_EVENT structured log
//! GET /changes
//!     → newest-first slice of the timeline
//! ```
//!
//! # Design Decisions
//! - Registration never rejects input; every field coerces to a string
//! - The timeline is a mutex-guarded ring so concurrent appends are safe and
//!   memory stays bounded

pub mod timeline;

pub use timeline::{ChangeEvent, ChangeRegistry, TIMELINE_CAPACITY};
