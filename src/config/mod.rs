//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `COURIER_LINK` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use courier_link::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Connecting to {}", config.connection.url);
//! ```

mod connection;
mod error;
mod feed;
mod heartbeat;
mod location;
mod retry;
mod telemetry;

pub use connection::ConnectionConfig;
pub use error::{ConfigError, ValidationError};
pub use feed::FeedConfig;
pub use heartbeat::HeartbeatConfig;
pub use location::LocationConfig;
pub use retry::RetryConfig;
pub use telemetry::TelemetryConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the Courier Link client.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Gateway connection (endpoint, bearer token)
    pub connection: ConnectionConfig,

    /// Reconnection retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Keep-alive cadence
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,

    /// Location reporting cadence
    #[serde(default)]
    pub location: LocationConfig,

    /// Notification feed bounds
    #[serde(default)]
    pub feed: FeedConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `COURIER_LINK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `COURIER_LINK__CONNECTION__URL=wss://...` -> `connection.url = ...`
    /// - `COURIER_LINK__RETRY__MAX_ATTEMPTS=5` -> `retry.max_attempts = 5`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COURIER_LINK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.connection.validate()?;
        self.retry.validate()?;
        self.heartbeat.validate()?;
        self.location.validate()?;
        self.feed.validate()?;
        Ok(())
    }
}
