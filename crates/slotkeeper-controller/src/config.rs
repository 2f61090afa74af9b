//! Controller configuration.
//!
//! Every field has a default, so an empty (or missing) file is a valid
//! configuration.
//!
//! ```toml
//! master_code = "CBAD"
//! message_hold_ms = 2000
//! table_hold_ms = 4000
//! seed = 42
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use slotkeeper_core::{
    MasterCode,
    constants::{DEFAULT_MESSAGE_HOLD_MS, DEFAULT_TABLE_HOLD_MS},
};
use thiserror::Error;

use crate::state_machine::Hold;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl From<ConfigError> for slotkeeper_core::Error {
    fn from(error: ConfigError) -> Self {
        slotkeeper_core::Error::Config(error.to_string())
    }
}

/// Controller settings.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use slotkeeper_controller::ControllerConfig;
///
/// let config = ControllerConfig::default()
///     .with_message_hold(Duration::from_millis(500))
///     .with_seed(7);
///
/// assert_eq!(config.message_hold(), Duration::from_millis(500));
/// assert_eq!(config.seed, Some(7));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Code that shows the slot table and clears the lock.
    pub master_code: MasterCode,

    /// How long confirmation and refusal messages stay up.
    pub message_hold_ms: u64,

    /// How long the slot table stays up.
    pub table_hold_ms: u64,

    /// Fixed PIN generator seed. OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            master_code: MasterCode::default(),
            message_hold_ms: DEFAULT_MESSAGE_HOLD_MS,
            table_hold_ms: DEFAULT_TABLE_HOLD_MS,
            seed: None,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from a TOML file and validate it.
    ///
    /// # Errors
    ///
    /// - `ConfigError::ReadError` if the file cannot be read
    /// - `ConfigError::ParseError` if it is not valid TOML for this struct,
    ///   including an invalid master code
    /// - `ConfigError::ValidationError` if a value is out of range
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: ControllerConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Both hold durations must be nonzero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.message_hold_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "message_hold_ms must be greater than zero".to_string(),
            });
        }

        if self.table_hold_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "table_hold_ms must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    pub fn with_master_code(mut self, code: MasterCode) -> Self {
        self.master_code = code;
        self
    }

    pub fn with_message_hold(mut self, hold: Duration) -> Self {
        self.message_hold_ms = hold.as_millis() as u64;
        self
    }

    pub fn with_table_hold(mut self, hold: Duration) -> Self {
        self.table_hold_ms = hold.as_millis() as u64;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn message_hold(&self) -> Duration {
        Duration::from_millis(self.message_hold_ms)
    }

    pub fn table_hold(&self) -> Duration {
        Duration::from_millis(self.table_hold_ms)
    }

    /// Duration of a hold kind.
    pub fn hold_duration(&self, hold: Hold) -> Duration {
        match hold {
            Hold::Message => self.message_hold(),
            Hold::Table => self.table_hold(),
        }
    }
}
