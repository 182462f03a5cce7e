//! Service configuration.
//!
//! Loaded once at startup from a TOML file and never mutated afterwards.
//! The reference deployment's table is compiled in so the service can run
//! without any file on disk.

use crate::districts::DistrictRegistry;
use crate::logging::LogLevel;
use crate::model::DistrictConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// File looked up in the working directory by the binaries.
pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

const REFERENCE_CONFIG: &str = include_str!("../dashboard.toml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    /// Append every log line to this file instead of stderr.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_true")]
    pub timestamps: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            level: default_log_level(),
            file: None,
            timestamps: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_host")]
    pub telemetry_host: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_poll_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_stale_secs")]
    pub stale_after_secs: u64,
    #[serde(default)]
    pub logging: LogSettings,
    pub districts: Vec<DistrictConfig>,
}

fn default_host() -> String {
    "https://api.thingspeak.com".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_poll_secs() -> u64 {
    15
}

fn default_stale_secs() -> u64 {
    60
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_true() -> bool {
    true
}

impl DashboardConfig {
    /// The three-district reference deployment.
    pub fn reference() -> Result<Self, ConfigError> {
        Self::from_toml_str(REFERENCE_CONFIG)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` if it exists, otherwise falls back to the reference table.
    pub fn load_or_reference(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::reference()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telemetry_host.trim().is_empty() {
            return Err(ConfigError::Invalid("telemetry_host is empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be > 0".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("poll_interval_secs must be > 0".into()));
        }
        if self.stale_after_secs == 0 {
            return Err(ConfigError::Invalid("stale_after_secs must be > 0".into()));
        }
        DistrictRegistry::new(self.districts.clone()).map(|_| ())
    }

    pub fn registry(&self) -> Result<DistrictRegistry, ConfigError> {
        DistrictRegistry::new(self.districts.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.stale_after_secs as i64)
    }
}
