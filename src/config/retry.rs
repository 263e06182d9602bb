//! Reconnection retry configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Consecutive failed attempts before the client gives up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay for the linear backoff, in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl RetryConfig {
    /// Validate retry configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 || self.max_attempts > 20 {
            return Err(ValidationError::InvalidRetryCap);
        }
        if self.base_delay_ms == 0 {
            return Err(ValidationError::InvalidRetryDelay);
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    2000
}
