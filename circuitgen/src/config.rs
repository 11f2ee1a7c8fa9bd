//! Runtime configuration.
//!
//! Built once at startup and handed to the service and CLI; nothing reads it
//! from global state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid setting '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Largest component count accepted on create or update
    pub max_components: usize,
    /// Page size used when a listing does not ask for one
    pub default_page_limit: usize,
    /// Upper bound on any listing page size
    pub max_page_limit: usize,
    /// Longest simulated interval, in seconds
    pub max_simulation_time: f64,
    /// Most time points a single simulation may produce
    pub max_time_points: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("circuitgen.db"),
            max_components: 1000,
            default_page_limit: 100,
            max_page_limit: 1000,
            max_simulation_time: 60.0,
            max_time_points: 1_000_000,
        }
    }
}

impl Config {
    /// Load a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.check()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_page_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "max_page_limit",
                message: "must be at least 1".to_string(),
            });
        }
        if self.default_page_limit > self.max_page_limit {
            return Err(ConfigError::Invalid {
                key: "default_page_limit",
                message: format!("exceeds max_page_limit ({})", self.max_page_limit),
            });
        }
        if !(self.max_simulation_time > 0.0) {
            return Err(ConfigError::Invalid {
                key: "max_simulation_time",
                message: "must be positive".to_string(),
            });
        }
        if self.max_time_points == 0 {
            return Err(ConfigError::Invalid {
                key: "max_time_points",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
