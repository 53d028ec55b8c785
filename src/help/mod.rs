//! help
//!
//! Human-readable output: usage, group index, version and diagnostics.
//!
//! # Format
//!
//! ```text
//! Usage: prog nested hello [--name <String>] [--verbose] [--help] arg0
//!
//! Greets someone.
//!
//! Arguments:
//!   0: arg0    (Required)
//!
//! Options:
//!   -n, --name <String>    Name to greet (Default: Alice)
//!   --verbose
//!   -h, --help             Show help message
//! ```

mod table;

use table::Table;

use crate::core::types::ProgramInfo;
use crate::engine::builtin::BuiltInOptions;
use crate::engine::resolver::ResolveError;
use crate::model::{ArgumentDescriptor, GroupNode, LeafNode, OptionDescriptor, ParameterList};

fn command_line(program: &ProgramInfo, path: &[String]) -> String {
    std::iter::once(program.name.as_str())
        .chain(path.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn builtin_usage(builtins: &BuiltInOptions) -> Vec<String> {
    let mut items = Vec::new();
    if builtins.help {
        items.push("[--help]".to_string());
    }
    if builtins.version_listed {
        items.push("[--version]".to_string());
    }
    items
}

fn builtin_rows(table: &mut Table, builtins: &BuiltInOptions) {
    if builtins.help {
        let left = if builtins.help_short {
            "-h, --help"
        } else {
            "--help"
        };
        table.row(left, "Show help message");
    }
    if builtins.version_listed {
        table.row("--version", "Show version");
    }
}

fn push_section(out: &mut String, title: &str, table: &Table) {
    if table.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(title);
    out.push_str(":\n");
    out.push_str(&table.render());
}

/// Index for a group: usage, description, child commands and options.
pub fn render_index(
    program: &ProgramInfo,
    group: &GroupNode,
    path: &[String],
    builtins: &BuiltInOptions,
) -> String {
    let line = command_line(program, path);
    let mut out = format!("Usage: {} [command]\n", line);
    let options = builtin_usage(builtins);
    if !options.is_empty() {
        out.push_str(&format!("Usage: {} {}\n", line, options.join(" ")));
    }

    if !group.description().is_empty() {
        out.push('\n');
        out.push_str(group.description());
        out.push('\n');
    }

    let mut commands = Table::new();
    for child in group.children() {
        commands.row(child.name(), child.description());
    }
    push_section(&mut out, "Commands", &commands);

    let mut rows = Table::new();
    builtin_rows(&mut rows, builtins);
    push_section(&mut out, "Options", &rows);
    out
}

fn option_usage(option: &OptionDescriptor) -> String {
    if option.is_flag() {
        format!("[--{}]", option.name)
    } else if option.is_required() {
        format!("--{} <{}>", option.name, option.value_type)
    } else {
        format!("[--{} <{}>]", option.name, option.value_type)
    }
}

fn argument_usage(argument: &ArgumentDescriptor) -> String {
    if argument.value_type.is_array() {
        format!("{}...", argument.name)
    } else if argument.is_required() {
        argument.name.clone()
    } else {
        format!("[{}]", argument.name)
    }
}

fn annotated(description: &str, annotations: &[String]) -> String {
    std::iter::once(description)
        .chain(annotations.iter().map(String::as_str))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn option_row(option: &OptionDescriptor) -> (String, String) {
    let mut left = match option.short {
        Some(alias) => format!("-{}, --{}", alias, option.name),
        None => format!("--{}", option.name),
    };
    if !option.is_flag() {
        left.push_str(&format!(" <{}>", option.value_type));
    }

    let mut annotations = Vec::new();
    if option.is_required() {
        annotations.push("(Required)".to_string());
    } else if let Some(default) = &option.default {
        if !option.is_flag() {
            annotations.push(format!("(Default: {})", default));
        }
    }
    if let Some(values) = option.value_type.allowed_values() {
        annotations.push(format!("(Allowed values: {})", values.join(", ")));
    }
    (left, annotated(&option.description, &annotations))
}

fn argument_row(index: usize, argument: &ArgumentDescriptor) -> (String, String) {
    let mut annotations = Vec::new();
    if argument.is_required() {
        annotations.push("(Required)".to_string());
    } else if let Some(default) = &argument.default {
        annotations.push(format!("(Default: {})", default));
    }
    if let Some(values) = argument.value_type.allowed_values() {
        annotations.push(format!("(Allowed values: {})", values.join(", ")));
    }
    (
        format!("{}: {}", index, argument.name),
        annotated(&argument.description, &annotations),
    )
}

/// Help for one command.
pub fn render_command(
    program: &ProgramInfo,
    path: &[String],
    leaf: &LeafNode,
    parameters: &ParameterList,
    builtins: &BuiltInOptions,
) -> String {
    let mut usage = vec![command_line(program, path)];
    usage.extend(parameters.options().map(option_usage));
    usage.extend(builtin_usage(builtins));
    usage.extend(parameters.arguments().map(argument_usage));
    let mut out = format!("Usage: {}\n", usage.join(" "));

    if !leaf.description().is_empty() {
        out.push('\n');
        out.push_str(leaf.description());
        out.push('\n');
    }

    let mut arguments = Table::new();
    for (index, argument) in parameters.arguments().enumerate() {
        let (left, right) = argument_row(index, argument);
        arguments.row(left, right);
    }
    push_section(&mut out, "Arguments", &arguments);

    let mut options = Table::new();
    for option in parameters.options() {
        let (left, right) = option_row(option);
        options.row(left, right);
    }
    builtin_rows(&mut options, builtins);
    push_section(&mut out, "Options", &options);
    out
}

/// The `--version` output line.
pub fn render_version(program: &ProgramInfo) -> String {
    program.version_line()
}

/// Diagnostic for an unknown command, with similar commands if any.
pub fn render_unknown_command(error: &ResolveError) -> String {
    let ResolveError::UnknownCommand { suggestions, .. } = error;
    let mut out = format!("Error: {}\n", error);
    if !suggestions.is_empty() {
        out.push_str("\nSimilar commands:\n");
        for suggestion in suggestions {
            out.push_str(&format!("  {}\n", suggestion));
        }
    }
    out
}

/// Report for a fault that escaped the command pipeline.
pub fn render_fault(program: &ProgramInfo, path: &[String], error: &anyhow::Error) -> String {
    let mut out = format!("Unhandled Exception: {}\n", error);
    for cause in error.chain().skip(1) {
        out.push_str(&format!("  Caused by: {}\n", cause));
    }
    out.push_str(&format!("   at {}\n", command_line(program, path)));
    out
}
