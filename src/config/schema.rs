//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the kitchen
//! service. Every field has a default so the process boots with no environment
//! set at all.

use serde::Serialize;

/// Root configuration for the kitchen service.
#[derive(Debug, Clone, Default)]
pub struct KitchenConfig {
    /// Service identity stamped on every emitted signal.
    pub identity: DeploymentIdentity,

    /// Listener configuration (bind port).
    pub listener: ListenerConfig,

    /// Structured-log destinations and level.
    pub logging: LoggingConfig,

    /// Latency/outcome simulation knobs.
    pub simulation: SimulationConfig,

    /// Trace export settings.
    pub telemetry: TelemetryConfig,
}

/// Immutable deployment identity.
///
/// Read by every metric observation, log record, and trace span so that all
/// three signals for one request can be correlated back to a release.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentIdentity {
    pub service: String,
    pub env: String,
    pub owner: String,
    pub version: String,
    pub change_id: String,
}

impl Default for DeploymentIdentity {
    fn default() -> Self {
        Self {
            service: "kitchen-api".to_string(),
            env: "lab".to_string(),
            owner: "unknown".to_string(),
            version: "v1.0".to_string(),
            change_id: "none".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// TCP port to bind on all interfaces.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self { port: 5101 }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Append-only JSON log file. Stdout is always written as well.
    pub file: String,

    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "/var/log/kitchen/app.log".to_string(),
            level: "info".to_string(),
        }
    }
}

/// Simulation configuration.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Recipe version fed into every order simulation. Defaults to the
    /// deployment version so a release rollout changes simulated behaviour.
    pub recipe_version: String,

    /// Probability in [0,1) that an order fails outright before any
    /// latency is simulated. 0 disables injection.
    pub failure_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            recipe_version: DeploymentIdentity::default().version,
            failure_rate: 0.0,
        }
    }
}

/// Trace export configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Base URL of the span collector. Finished spans are POSTed to
    /// `<endpoint>/v1/traces` in batches.
    pub exporter_endpoint: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            exporter_endpoint: "http://127.0.0.1:4318".to_string(),
        }
    }
}
