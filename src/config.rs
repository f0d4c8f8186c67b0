//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! `iss-observer.toml` file. It provides a centralized way to configure the
//! position and ephemeris service endpoints, HTTP timeouts and retries, the
//! phase classification mode, the ideal observation window, and the report's
//! date format.
//!
//! Every section and field is optional; anything left out takes its default.

use crate::phase::{ClassificationMode, Evaluator, IdealWindow, PhaseError};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_PATH: &str = "iss-observer.toml";

/// Errors raised while reading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Window(#[from] PhaseError),

    #[error("invalid datetime format `{0}`")]
    DateTimeFormat(String),
}

/// Application configuration loaded from iss-observer.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Remote service configuration
    pub services: ServiceConfig,
    /// Phase classification configuration
    pub observation: ObservationConfig,
    /// Report formatting configuration
    pub display: DisplayConfig,
}

/// Endpoints and HTTP policy for the position and ephemeris services
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Open Notify "ISS Now" endpoint
    pub iss_url: String,
    /// sunrise-sunset.org JSON endpoint
    pub sun_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Extra attempts after a transport error or 5xx response
    pub retry_attempts: u32,
    /// Pause between attempts in milliseconds
    pub retry_delay_ms: u64,
}

/// How the observation instant is classified
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservationConfig {
    pub mode: ClassificationMode,
    /// Lower bound of the ideal window, inclusive
    pub ideal_min_minutes: i64,
    /// Upper bound of the ideal window, inclusive
    pub ideal_max_minutes: i64,
}

/// Report formatting
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// chrono strftime pattern for the observation time
    pub datetime_format: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            iss_url: "http://api.open-notify.org/iss-now.json".to_string(),
            sun_url: "https://api.sunrise-sunset.org/json".to_string(),
            timeout_secs: 10,
            retry_attempts: 2,
            retry_delay_ms: 500,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for ObservationConfig {
    fn default() -> Self {
        ObservationConfig {
            mode: ClassificationMode::default(),
            ideal_min_minutes: 60,
            ideal_max_minutes: 120,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            datetime_format: "%d. %m. %Y %H:%M".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from iss-observer.toml in the working directory
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(DEFAULT_PATH)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(&path) {
            Ok(config) => {
                tracing::info!("Loaded configuration from {}", path.as_ref().display());
                config
            }
            Err(ConfigError::Read { .. }) => {
                tracing::info!("No config file found, using default configuration");
                Self::default()
            }
            Err(e) => {
                tracing::warn!("{}", e);
                tracing::warn!("Using default configuration");
                Self::default()
            }
        }
    }

    /// Read and parse a config file, reporting every failure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the values that TOML parsing alone cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ideal_window()?;

        let format = &self.display.datetime_format;
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::DateTimeFormat(format.clone()));
        }
        Ok(())
    }

    pub fn ideal_window(&self) -> Result<IdealWindow, ConfigError> {
        let window = IdealWindow::from_minutes(
            self.observation.ideal_min_minutes,
            self.observation.ideal_max_minutes,
        )?;
        Ok(window)
    }

    /// Evaluator built from the observation section.
    pub fn evaluator(&self) -> Result<Evaluator, ConfigError> {
        Ok(Evaluator::new(self.observation.mode, self.ideal_window()?))
    }
}
