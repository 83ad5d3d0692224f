pub mod paths;
pub mod projection;

use crate::scaling::ScalingChoice;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub use paths::PathConfig;
pub use projection::ProjectionConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("projection limit must be a positive number of processes")]
    ZeroLimit,

    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Main configuration of a model factor analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scaling: ScalingChoice,
    pub projection: ProjectionConfig,
    pub paths: PathConfig,
    pub debug: bool,
}

impl Config {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.projection.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        Ok(())
    }
}
