//! Telemetry configuration

use serde::Deserialize;

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Rust log filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info,courier_link=debug".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_enables_crate_debug() {
        let config = TelemetryConfig::default();
        assert!(config.log_filter.contains("courier_link=debug"));
    }
}
