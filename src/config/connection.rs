//! Gateway connection configuration

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;

/// Connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Realtime gateway endpoint (`ws://` or `wss://`)
    pub url: String,

    /// Optional bearer token for the handshake
    #[serde(default)]
    pub token: Option<SecretString>,
}

impl ConnectionConfig {
    /// Validate connection configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.url.starts_with("ws://") && !self.url.starts_with("wss://") {
            return Err(ValidationError::InvalidGatewayUrl);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ws_and_wss_urls() {
        let config = ConnectionConfig {
            url: "ws://localhost:4000/realtime".to_string(),
            token: None,
        };
        assert!(config.validate().is_ok());

        let config = ConnectionConfig {
            url: "wss://gateway.example.com/realtime".to_string(),
            token: None,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_http_urls() {
        let config = ConnectionConfig {
            url: "https://gateway.example.com".to_string(),
            token: None,
        };
        assert!(config.validate().is_err());
    }
}
