//! Heartbeat configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Heartbeat configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatConfig {
    /// Keep-alive cadence while connected, in seconds
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl HeartbeatConfig {
    /// Validate heartbeat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_secs == 0 || self.interval_secs > 300 {
            return Err(ValidationError::InvalidHeartbeatInterval);
        }
        Ok(())
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_thirty_seconds() {
        let config = HeartbeatConfig::default();
        assert_eq!(config.interval_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_intervals() {
        assert!(HeartbeatConfig { interval_secs: 0 }.validate().is_err());
        assert!(HeartbeatConfig { interval_secs: 600 }.validate().is_err());
    }
}
