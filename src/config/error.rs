//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Gateway URL must start with ws:// or wss://")]
    InvalidGatewayUrl,

    #[error("Retry attempt cap must be between 1 and 20")]
    InvalidRetryCap,

    #[error("Retry base delay must be at least 1 ms")]
    InvalidRetryDelay,

    #[error("Heartbeat interval must be between 1 and 300 seconds")]
    InvalidHeartbeatInterval,

    #[error("Location poll interval must be at least 1 second")]
    InvalidLocationInterval,

    #[error("Notification feed capacity must be between 1 and 1000")]
    InvalidFeedCapacity,
}
