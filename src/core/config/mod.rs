//! core::config
//!
//! Application options and loading.
//!
//! # Overview
//!
//! Options tune engine policy (completion support, suggestion sensitivity,
//! name normalization). They are plain values: a host can construct them
//! in code, or load them from a TOML file it owns.
//!
//! # Precedence
//!
//! 1. Default values
//! 2. Values present in the loaded TOML document
//!
//! # Example
//!
//! ```
//! use trellis::core::config::AppOptions;
//!
//! let options = AppOptions::from_toml_str("max_suggestions = 5").unwrap();
//! assert_eq!(options.max_suggestions, 5);
//! assert!(options.enable_shell_completion);
//! ```

pub mod schema;

pub use schema::{AppOptions, NameCase};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {message}")]
    ParseError { message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

impl AppOptions {
    /// Parse and validate options from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for malformed TOML or unknown keys,
    /// and `ConfigError::InvalidValue` for out-of-range values.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let options: AppOptions = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read, plus
    /// every error [`AppOptions::from_toml_str`] can return.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Serialize the options back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}
