//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `autotap.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use autotap_domain::geometry::ScreenSize;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Simulated device settings.
    pub host: HostConfig,
    /// Scenario to replay.
    pub scenario: ScenarioConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Virtual host configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    /// Duration of a synthesized tap, in milliseconds.
    pub tap_timeout_ms: u64,
    /// Activity id of the home screen, if known.
    pub launcher_activity_id: Option<String>,
}

/// Scenario file location.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub path: PathBuf,
}

impl Config {
    /// Load configuration from `autotap.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("autotap.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("AUTOTAP_SCENARIO") {
            self.scenario.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("AUTOTAP_SCREEN") {
            if let Some((width, height)) = val.split_once('x') {
                if let (Ok(width), Ok(height)) = (width.parse(), height.parse()) {
                    self.host.screen_width = width;
                    self.host.screen_height = height;
                }
            }
        }
        if let Ok(val) = std::env::var("AUTOTAP_LAUNCHER") {
            self.host.launcher_activity_id = Some(val);
        }
        if let Ok(val) = std::env::var("AUTOTAP_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.screen_width == 0 || self.host.screen_height == 0 {
            return Err(ConfigError::Validation(
                "screen dimensions must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn screen_size(&self) -> ScreenSize {
        ScreenSize::new(self.host.screen_width, self.host.screen_height)
    }

    #[must_use]
    pub fn tap_timeout(&self) -> Duration {
        Duration::from_millis(self.host.tap_timeout_ms)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "autotapd=info,autotap=info".to_string(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            screen_width: 1080,
            screen_height: 1920,
            tap_timeout_ms: 100,
            launcher_activity_id: None,
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("scenario.json"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
