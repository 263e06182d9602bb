//! Notification feed configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Notification feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Maximum notifications kept client-side
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl FeedConfig {
    /// Validate feed configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.capacity == 0 || self.capacity > 1000 {
            return Err(ValidationError::InvalidFeedCapacity);
        }
        Ok(())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    50
}
