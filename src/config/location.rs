//! Location reporting configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Location reporting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    /// Position poll cadence, in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl LocationConfig {
    /// Validate location configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval_secs == 0 {
            return Err(ValidationError::InvalidLocationInterval);
        }
        Ok(())
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    10
}
