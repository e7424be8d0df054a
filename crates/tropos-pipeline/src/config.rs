//! Configuration for the analysis pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the two-stage pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Floor for the inter-stage cooldown, in seconds. The actual cooldown
    /// is `max(minimum_pause, rpm_ceiling - rolling_window_usage)` so a
    /// nearly saturated budget stretches the pause toward a full window.
    pub minimum_pause_secs: u64,
}

impl PipelineConfig {
    /// Cooldown floor as a Duration
    pub fn minimum_pause(&self) -> Duration {
        Duration::from_secs(self.minimum_pause_secs)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("failed to serialize TOML: {}", e))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            minimum_pause_secs: 6,
        }
    }
}
