//! Bounded, append-only timeline of deployment change events.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::config::DeploymentIdentity;

/// Retained history bound; `recent` can never return more than this.
pub const TIMELINE_CAPACITY: usize = 50;

/// An administrative record of a deployment change. Immutable once stored.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub ts: DateTime<Utc>,
    pub change_id: String,
    pub version: String,
    pub owner: String,
    pub description: String,
}

/// In-memory registry of change events.
///
/// Appends are mutex-guarded; the ring drops the oldest event once the
/// capacity is reached, so storage never grows past TIMELINE_CAPACITY.
pub struct ChangeRegistry {
    identity: Arc<DeploymentIdentity>,
    timeline: Mutex<VecDeque<ChangeEvent>>,
}

impl ChangeRegistry {
    pub fn new(identity: Arc<DeploymentIdentity>) -> Self {
        Self {
            identity,
            timeline: Mutex::new(VecDeque::with_capacity(TIMELINE_CAPACITY)),
        }
    }

    /// Validate, normalize, and store one change description.
    ///
    /// Missing or empty change_id/version/owner fall back to the deployment
    /// identity; description defaults to "". Non-string values are coerced,
    /// never rejected. Emits a CHANGE_EVENT structured log entry.
    pub fn register(&self, raw: &Value) -> ChangeEvent {
        let event = ChangeEvent {
            ts: Utc::now(),
            change_id: field_or(raw, "change_id", &self.identity.change_id),
            version: field_or(raw, "version", &self.identity.version),
            owner: field_or(raw, "owner", &self.identity.owner),
            description: field_or(raw, "description", ""),
        };

        {
            // A poisoned lock still holds a valid timeline.
            let mut timeline = self
                .timeline
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            timeline.push_back(event.clone());
            if timeline.len() > TIMELINE_CAPACITY {
                timeline.pop_front();
            }
        }

        tracing::info!(
            event_type = "CHANGE_EVENT",
            change_id = %event.change_id,
            version = %event.version,
            owner = %event.owner,
            description = %event.description,
            "CHANGE_EVENT"
        );
        event
    }

    /// Up to `limit` most recent events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ChangeEvent> {
        let timeline = self
            .timeline
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        timeline.iter().rev().take(limit).cloned().collect()
    }
}

fn field_or(raw: &Value, key: &str, default: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Null) | Some(Value::String(_)) | None => default.to_string(),
        // Numbers, bools, arrays, objects all coerce to their JSON text.
        Some(other) => other.to_string(),
    }
}
