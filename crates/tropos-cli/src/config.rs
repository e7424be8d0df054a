//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tropos_limiter::LimiterConfig;
use tropos_pipeline::PipelineConfig;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// API key; the GEMINI_API_KEY and GOOGLE_API_KEY environment
    /// variables take precedence over this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Ceiling on speeches processed in one batch run
    #[serde(default = "default_max_speeches")]
    pub max_speeches_per_run: usize,

    /// Model identities and their quotas
    #[serde(default)]
    pub limits: LimiterConfig,

    /// Pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable format
    Plain,
    /// JSON format
    Json,
}

impl Config {
    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".tropos").join("config.toml"))
    }

    /// Load configuration from the default location, or fall back to
    /// defaults when no file exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config
            .limits
            .validate()
            .map_err(|e| CliError::Config(format!("invalid limits in {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Resolve the API key: environment first, then the config file.
    pub fn resolve_api_key(&self) -> Result<String> {
        env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
            .ok_or_else(|| {
                CliError::Config(
                    "No API key. Set GEMINI_API_KEY (or GOOGLE_API_KEY), or add api_key to the config file".into(),
                )
            })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            api_key: None,
            max_speeches_per_run: default_max_speeches(),
            limits: LimiterConfig::default(),
            pipeline: PipelineConfig::default(),
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Plain,
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".tropos").join("speeches.db"))
        .unwrap_or_else(|| PathBuf::from("speeches.db"))
}

fn default_max_speeches() -> usize {
    50
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Plain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_speeches_per_run, 50);
        assert!(config.settings.color);
        assert!(config.limits.validate().is_ok());
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.max_speeches_per_run, config.max_speeches_per_run);
        assert_eq!(parsed.limits.stage1_model, config.limits.stage1_model);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = toml::from_str("max_speeches_per_run = 5").unwrap();
        assert_eq!(parsed.max_speeches_per_run, 5);
        assert_eq!(parsed.limits.stage1_model, "gemini-2.0-flash");
        assert_eq!(parsed.pipeline.minimum_pause_secs, 6);
    }

    #[test]
    fn test_load_from_rejects_invalid_limits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[limits]
stage1_model = ""
stage1_limits = { rpm = 15, rpd = 200 }
stage2_model = "gemini-2.5-flash"
stage2_limits = { rpm = 10, rpd = 250 }
"#,
        )
        .unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
