//! engine::builtin
//!
//! Built-in `--help` and `--version` options.
//!
//! Declared options always win: a command declaring `-h` suppresses the
//! built-in short alias for help (long `--help` still works), and a command
//! declaring `--help` or `--version` itself shadows the built-in entirely.
//! `--version` is accepted everywhere but only listed in help at the root.

use crate::core::config::schema::AppOptions;
use crate::model::ParameterList;
use crate::parse::{OptionSpec, OptionTable, ParsedCommandLine};

pub const HELP: &str = "help";
pub const VERSION: &str = "version";

/// Which built-in options apply at one resolution point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltInOptions {
    pub help: bool,
    pub help_short: bool,
    pub version: bool,
    /// Whether help output lists `--version`.
    pub version_listed: bool,
}

impl BuiltInOptions {
    /// Built-ins for a leaf with `parameters`.
    pub fn for_leaf(options: &AppOptions, parameters: &ParameterList, at_root: bool) -> Self {
        let help = parameters.option(HELP).is_none();
        let claims_h = parameters.claims_short('h');
        if help && options.enable_help_short_alias && claims_h {
            tracing::warn!("command declares -h; built-in -h for help suppressed");
        }
        Self {
            help,
            help_short: help && options.enable_help_short_alias && !claims_h,
            version: parameters.option(VERSION).is_none(),
            version_listed: at_root && parameters.option(VERSION).is_none(),
        }
    }

    /// Built-ins for a group (index) resolution point.
    pub fn for_group(options: &AppOptions, at_root: bool) -> Self {
        Self {
            help: true,
            help_short: options.enable_help_short_alias,
            version: true,
            version_listed: at_root,
        }
    }

    /// Add the active built-ins to a tokenizer table.
    pub fn extend(&self, table: &mut OptionTable) {
        if self.help {
            let spec = OptionSpec::flag(HELP);
            table.push(if self.help_short {
                spec.with_short('h')
            } else {
                spec
            });
        }
        if self.version {
            table.push(OptionSpec::flag(VERSION));
        }
    }

    pub fn help_requested(&self, parsed: &ParsedCommandLine) -> bool {
        self.help && parsed.has(HELP)
    }

    pub fn version_requested(&self, parsed: &ParsedCommandLine) -> bool {
        self.version && parsed.has(VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Param, ValueType};

    #[test]
    fn declared_h_suppresses_short_help() {
        let parameters = ParameterList::new(&[Param::flag("host").short('h')]).unwrap();
        let builtins = BuiltInOptions::for_leaf(&AppOptions::default(), &parameters, true);
        assert!(builtins.help);
        assert!(!builtins.help_short);

        let mut table = OptionTable::from_parameters(&parameters);
        builtins.extend(&mut table);
        assert_eq!(table.short('h').map(|s| s.name.as_str()), Some("host"));
        assert!(table.long(HELP).is_some());
    }

    #[test]
    fn version_accepted_everywhere_but_listed_at_root() {
        let parameters = ParameterList::default();
        let options = AppOptions::default();

        let root = BuiltInOptions::for_leaf(&options, &parameters, true);
        assert!(root.version && root.version_listed);

        let nested = BuiltInOptions::for_leaf(&options, &parameters, false);
        assert!(nested.version);
        assert!(!nested.version_listed);

        let group = BuiltInOptions::for_group(&options, false);
        assert!(group.version);
        assert!(!group.version_listed);
    }

    #[test]
    fn declared_version_option_shadows_builtin() {
        let parameters = ParameterList::new(&[Param::flag("version")]).unwrap();
        let builtins = BuiltInOptions::for_leaf(&AppOptions::default(), &parameters, true);
        assert!(!builtins.version);
        assert!(!builtins.version_listed);
    }

    #[test]
    fn declared_help_option_shadows_builtin() {
        let parameters = ParameterList::new(&[Param::new("help", ValueType::String)]).unwrap();
        let builtins = BuiltInOptions::for_leaf(&AppOptions::default(), &parameters, false);
        assert!(!builtins.help);
    }

    #[test]
    fn short_alias_can_be_disabled() {
        let options = AppOptions {
            enable_help_short_alias: false,
            ..AppOptions::default()
        };
        assert!(!BuiltInOptions::for_group(&options, true).help_short);
    }
}
