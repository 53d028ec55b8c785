//! core::config::schema
//!
//! Application options schema.
//!
//! # Example
//!
//! ```toml
//! enable_shell_completion = true
//! enable_help_short_alias = true
//! suggestion_threshold = 0.5
//! max_suggestions = 3
//! command_name_case = "kebab"
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing; see [`AppOptions::validate`].

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// How registered command names are normalized at build time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    /// Convert to kebab-case (`ExitCode` -> `exit-code`).
    #[default]
    Kebab,
    /// Use names exactly as registered.
    Verbatim,
}

/// Engine options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppOptions {
    /// Answer `--completion` and `--completion-candidates` requests.
    pub enable_shell_completion: bool,

    /// Let `-h` select help unless a command declares `-h` itself.
    pub enable_help_short_alias: bool,

    /// Minimum normalized similarity for "Similar commands" output.
    pub suggestion_threshold: f64,

    /// Maximum number of similar commands listed.
    pub max_suggestions: usize,

    /// Command name normalization.
    pub command_name_case: NameCase,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            enable_shell_completion: true,
            enable_help_short_alias: true,
            suggestion_threshold: 0.5,
            max_suggestions: 3,
            command_name_case: NameCase::Kebab,
        }
    }
}

impl AppOptions {
    /// Validate the option values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.suggestion_threshold) {
            return Err(ConfigError::InvalidValue(format!(
                "suggestion_threshold must be within [0, 1], got {}",
                self.suggestion_threshold
            )));
        }
        if self.max_suggestions == 0 {
            return Err(ConfigError::InvalidValue(
                "max_suggestions must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
