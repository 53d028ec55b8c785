//! parse
//!
//! Tokenizing raw argument strings into a [`ParsedCommandLine`].
//!
//! # Architecture
//!
//! The tokenizer works against an [`OptionTable`]: the long names, short
//! aliases and flag-ness of every option the resolved command accepts,
//! including the built-in ones. It needs the table to know whether
//! `--name` consumes the following token.
//!
//! The output is immutable and is consumed by both the binder and the
//! completion subsystem.

pub mod tokenizer;

pub use tokenizer::tokenize;

use thiserror::Error;

use crate::model::ParameterList;

/// Malformed token shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("'{token}' combines several short options; pass them separately")]
    ClusteredShortOptions { token: String },

    #[error("Option '--{option}' requires a value.")]
    MissingValue { option: String },

    #[error("'{token}' has an empty option name")]
    EmptyOptionName { token: String },
}

/// One option accepted by a command, as seen by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: String,
    pub short: Option<char>,
    pub is_flag: bool,
    pub stop_parsing: bool,
}

impl OptionSpec {
    /// A boolean flag with no short alias.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: None,
            is_flag: true,
            stop_parsing: false,
        }
    }

    pub fn with_short(mut self, alias: char) -> Self {
        self.short = Some(alias);
        self
    }
}

/// The options a command accepts.
#[derive(Debug, Clone, Default)]
pub struct OptionTable {
    specs: Vec<OptionSpec>,
}

impl OptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table of a command's declared options.
    pub fn from_parameters(parameters: &ParameterList) -> Self {
        let specs = parameters
            .options()
            .map(|o| OptionSpec {
                name: o.name.clone(),
                short: o.short,
                is_flag: o.is_flag(),
                stop_parsing: o.stop_parsing,
            })
            .collect();
        Self { specs }
    }

    /// Add an option unless its long name is already present. A short
    /// alias already claimed by another option is dropped.
    pub fn push(&mut self, mut spec: OptionSpec) -> &mut Self {
        if self.long(&spec.name).is_some() {
            return self;
        }
        if let Some(alias) = spec.short {
            if self.short(alias).is_some() {
                spec.short = None;
            }
        }
        self.specs.push(spec);
        self
    }

    pub fn long(&self, name: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn short(&self, alias: char) -> Option<&OptionSpec> {
        self.specs.iter().find(|s| s.short == Some(alias))
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> {
        self.specs.iter()
    }
}

/// One occurrence of an option on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOption {
    /// Long name for known options; the name as typed for unknown ones.
    pub name: String,
    /// Inline (`--name=value`) or following-token value.
    pub value: Option<String>,
    /// Index of the option token in the input.
    pub position: usize,
}

/// Tokenizer output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommandLine {
    pub(crate) options: Vec<ParsedOption>,
    pub(crate) arguments: Vec<String>,
    pub(crate) terminator: Option<usize>,
    pub(crate) unknown_options: Vec<ParsedOption>,
}

impl ParsedCommandLine {
    /// Known options in input order.
    pub fn options(&self) -> &[ParsedOption] {
        &self.options
    }

    /// Values of every occurrence of `name`, in input order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a str>> + 'a {
        self.options
            .iter()
            .filter(move |o| o.name == name)
            .map(|o| o.value.as_deref())
    }

    /// Whether `name` occurred at all.
    pub fn has(&self, name: &str) -> bool {
        self.options.iter().any(|o| o.name == name)
    }

    /// Positional tokens, terminator removed.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Number of positional tokens that preceded `--`, if it was present.
    pub fn terminator(&self) -> Option<usize> {
        self.terminator
    }

    /// Dash-prefixed tokens that matched no known option.
    pub fn unknown_options(&self) -> &[ParsedOption] {
        &self.unknown_options
    }
}
