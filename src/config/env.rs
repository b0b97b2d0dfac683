//! Configuration loading from the process environment.

use crate::config::schema::{
    DeploymentIdentity, KitchenConfig, ListenerConfig, LoggingConfig, SimulationConfig,
    TelemetryConfig,
};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl KitchenConfig {
    /// Read the full configuration from environment variables.
    ///
    /// Unset or empty variables take the documented defaults; unparseable
    /// numeric values also fall back rather than aborting startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let identity = DeploymentIdentity {
            service: env_or("SERVICE_NAME", &defaults.identity.service),
            env: env_or("ENV", &defaults.identity.env),
            owner: env_or("OWNER", &defaults.identity.owner),
            version: env_or("VERSION", &defaults.identity.version),
            change_id: env_or("CHANGE_ID", &defaults.identity.change_id),
        };

        let port = env_or("PORT", "")
            .parse()
            .unwrap_or(defaults.listener.port);

        let failure_rate = env_or("FAILURE_RATE", "")
            .parse()
            .unwrap_or(defaults.simulation.failure_rate);

        // The simulated recipe version tracks the deployment version unless
        // explicitly overridden.
        let recipe_version = env_or("RECIPE_VERSION", &identity.version);

        Self {
            listener: ListenerConfig { port },
            logging: LoggingConfig {
                file: env_or("LOG_FILE", &defaults.logging.file),
                level: env_or("LOG_LEVEL", &defaults.logging.level),
            },
            simulation: SimulationConfig {
                recipe_version,
                failure_rate,
            },
            telemetry: TelemetryConfig {
                exporter_endpoint: env_or(
                    "OTEL_EXPORTER_OTLP_ENDPOINT",
                    &defaults.telemetry.exporter_endpoint,
                ),
            },
            identity,
        }
    }
}
