//! core::types
//!
//! Strong types for core engine concepts.
//!
//! # Types
//!
//! - [`CommandName`] - Validated command name (unique among siblings)
//! - [`Version`] - Semantic version shown by `--version`
//! - [`ProgramInfo`] - Program name, version and description
//!
//! # Validation
//!
//! These types enforce validity at construction time. A command tree can
//! only be built from names the resolver is able to address.
//!
//! # Examples
//!
//! ```
//! use trellis::core::types::{CommandName, Version};
//!
//! let name = CommandName::new("exit-code").unwrap();
//! assert_eq!(name.as_str(), "exit-code");
//!
//! assert!(CommandName::new("--help").is_err());
//! assert!(Version::new("1.2.3").is_ok());
//! assert!(Version::new("1.2").is_err());
//! ```

use std::fmt;

use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid command name: {0}")]
    InvalidCommandName(String),

    #[error("invalid version: {0}")]
    InvalidVersion(String),
}

/// A validated command name.
///
/// Command names must be addressable as a positional token:
/// - Cannot be empty
/// - Cannot start with `-`
/// - Cannot contain whitespace or `=`
///
/// Names are compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandName(String);

impl CommandName {
    /// Create a new validated command name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCommandName` if the name cannot be typed
    /// as a leading positional token.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidCommandName(
                "command name cannot be empty".into(),
            ));
        }
        if name.starts_with('-') {
            return Err(TypeError::InvalidCommandName(format!(
                "'{}' cannot start with '-'",
                name
            )));
        }
        if name.chars().any(|c| c.is_whitespace() || c == '=') {
            return Err(TypeError::InvalidCommandName(format!(
                "'{}' cannot contain whitespace or '='",
                name
            )));
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CommandName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A semantic version: `MAJOR.MINOR.PATCH` with optional `-pre` and `+build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version(String);

impl Version {
    /// Create a new validated version.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidVersion` unless the core part is three
    /// dot-separated unsigned integers.
    pub fn new(version: impl Into<String>) -> Result<Self, TypeError> {
        let version = version.into();
        let core = version
            .split(['-', '+'])
            .next()
            .unwrap_or_default();

        let parts: Vec<&str> = core.split('.').collect();
        let well_formed = parts.len() == 3
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));

        if !well_formed {
            return Err(TypeError::InvalidVersion(format!(
                "'{}' is not MAJOR.MINOR.PATCH",
                version
            )));
        }
        Ok(Self(version))
    }

    /// Get the version as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self("0.0.0".to_string())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Version {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// Identity of the program built on the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    /// Program name as shown in usage lines.
    pub name: String,
    /// Version shown by `--version`.
    pub version: Version,
    /// One-line description shown in the root index.
    pub description: String,
}

impl ProgramInfo {
    /// Create program info with the default `0.0.0` version.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Version::default(),
            description: String::new(),
        }
    }

    /// The `--version` line: `<name> <version>`.
    pub fn version_line(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_name_rejects_option_like() {
        assert!(CommandName::new("-x").is_err());
        assert!(CommandName::new("").is_err());
        assert!(CommandName::new("a b").is_err());
        assert!(CommandName::new("a=b").is_err());
    }

    #[test]
    fn command_name_is_case_sensitive() {
        let lower = CommandName::new("hello").unwrap();
        let upper = CommandName::new("Hello").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn version_accepts_prerelease_and_build() {
        assert!(Version::new("1.0.0-beta.1").is_ok());
        assert!(Version::new("2.10.3+sha.abc").is_ok());
    }

    #[test]
    fn version_rejects_malformed() {
        assert!(Version::new("1").is_err());
        assert!(Version::new("1.x.0").is_err());
        assert!(Version::new("").is_err());
    }

    #[test]
    fn version_converts_from_string() {
        let version = Version::try_from("3.1.4".to_string()).unwrap();
        assert_eq!(String::from(version), "3.1.4");
        assert!(Version::try_from("3.1".to_string()).is_err());
    }

    #[test]
    fn version_line_format() {
        let mut info = ProgramInfo::new("demo");
        info.version = Version::new("1.2.3").unwrap();
        assert_eq!(info.version_line(), "demo 1.2.3");
    }
}
