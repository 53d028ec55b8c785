//! completion::candidates
//!
//! Answering `--completion-candidates` queries.

use super::source::{Candidate, CandidateSource, CandidatesMetadata};
use super::{CompletionError, CompletionShell};
use crate::core::config::schema::AppOptions;
use crate::engine::builtin::BuiltInOptions;
use crate::engine::resolver::{ResolveError, Resolution, Resolver};
use crate::parse::{tokenize, OptionTable};

/// Parameter name addressing the positional at the cursor.
pub const POSITIONAL: &str = "@";

fn by_prefix<'a>(
    candidates: impl IntoIterator<Item = Candidate> + 'a,
    partial: &'a str,
) -> impl Iterator<Item = Candidate> + 'a {
    candidates
        .into_iter()
        .filter(move |c| c.value.starts_with(partial))
}

/// Candidates for `parameter` given the words typed so far.
///
/// # Errors
///
/// Returns `CompletionError::UnknownCommand` when the words before the
/// in-progress token do not address a command. An unknown parameter is
/// not an error; it yields no candidates.
pub fn collect(
    resolver: &Resolver<'_>,
    options: &AppOptions,
    shell: CompletionShell,
    parameter: &str,
    words: &[String],
) -> Result<Vec<Candidate>, CompletionError> {
    let (partial, typed) = match words.split_last() {
        Some((last, init)) => (last.as_str(), init),
        None => ("", words),
    };

    let resolution = resolver.resolve(typed).map_err(|e| match e {
        ResolveError::UnknownCommand { token, mut path, .. } => {
            path.push(token);
            CompletionError::UnknownCommand {
                path: path.join(" "),
            }
        }
    })?;

    let parameter = match parameter {
        POSITIONAL => POSITIONAL,
        named => named.trim_start_matches('-'),
    };

    let resolved = match resolution {
        Resolution::Group(group) => {
            if parameter != POSITIONAL {
                return Ok(Vec::new());
            }
            let children = group
                .group
                .children()
                .map(|c| Candidate::new(c.name(), c.description()));
            return Ok(by_prefix(children, partial).collect());
        }
        Resolution::Leaf(leaf) => leaf,
    };

    let Some(parameters) = resolved.leaf.parameters() else {
        return Ok(Vec::new());
    };

    let mut table = OptionTable::from_parameters(parameters);
    BuiltInOptions::for_leaf(options, parameters, resolved.at_root()).extend(&mut table);
    let parsed = tokenize(&typed[resolved.consumed..], &table).unwrap_or_default();

    let target = if parameter == POSITIONAL {
        let arguments: Vec<_> = parameters.arguments().collect();
        let position = parsed.arguments().len();
        let argument = arguments
            .get(position)
            .or_else(|| arguments.last().filter(|a| a.value_type.is_array()));
        match argument {
            Some(argument) => Some((argument.candidates.as_ref(), &argument.value_type)),
            None if resolved.implicit && position == 0 => {
                let siblings = resolved
                    .parent
                    .children()
                    .map(|c| Candidate::new(c.name(), c.description()));
                return Ok(by_prefix(siblings, partial).collect());
            }
            None => None,
        }
    } else {
        parameters
            .option(parameter)
            .map(|o| (o.candidates.as_ref(), &o.value_type))
            .or_else(|| {
                parameters
                    .argument(parameter)
                    .map(|a| (a.candidates.as_ref(), &a.value_type))
            })
    };

    let Some((source, value_type)) = target else {
        tracing::debug!(parameter, "completion for unknown parameter");
        return Ok(Vec::new());
    };

    let metadata = CandidatesMetadata {
        shell,
        command_path: resolved.command_path(),
        parameter: parameter.to_string(),
        partial: partial.to_string(),
    };

    let candidates = match source {
        Some(CandidateSource::Provider(provider)) => provider.get_candidates(&metadata, &parsed),
        Some(CandidateSource::Static(values)) => {
            by_prefix(values.iter().cloned(), partial).collect()
        }
        None => match value_type.allowed_values() {
            Some(variants) => {
                by_prefix(variants.iter().map(|v| Candidate::new(v, "")), partial).collect()
            }
            None => Vec::new(),
        },
    };
    Ok(candidates)
}

fn escape_zsh(value: &str) -> String {
    value.replace(':', "\\:")
}

/// One line per candidate in the format the shell's script expects.
pub fn format_candidates(shell: CompletionShell, candidates: &[Candidate]) -> String {
    let mut out = String::new();
    for candidate in candidates {
        match shell {
            CompletionShell::Bash => out.push_str(&candidate.value),
            CompletionShell::Zsh => {
                out.push_str(&escape_zsh(&candidate.value));
                if !candidate.description.is_empty() {
                    out.push(':');
                    out.push_str(&candidate.description);
                }
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::schema::NameCase;
    use crate::core::types::ProgramInfo;
    use crate::engine::pipeline::FilterScope;
    use crate::model::{CommandBody, CommandSetBuilder, CommandTree, Param, ValueType};

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn tree() -> CommandTree {
        let mut set = CommandSetBuilder::new(FilterScope::Application);
        set.add_leaf("hello", CommandBody::from_fn(|_| Ok(())))
            .param(Param::new("name", ValueType::String).candidates_from(
                |_: &CandidatesMetadata, _: &crate::parse::ParsedCommandLine| {
                    vec![Candidate::new("Karen", "")]
                },
            ))
            .param(Param::new(
                "mood",
                ValueType::enumeration("Mood", ["Happy", "Hungry", "Sleepy"]),
            ))
            .param(Param::argument("target", ValueType::String).candidates(["alpha", "beta", "alps"]));
        set.add_leaf("konnichiwa", CommandBody::from_fn(|_| Ok(())));
        set.build_tree(ProgramInfo::new("prog"), NameCase::Kebab)
            .unwrap()
    }

    fn query(parameter: &str, words: &[&str]) -> Result<Vec<String>, CompletionError> {
        let tree = tree();
        let options = AppOptions::default();
        let resolver = Resolver::new(&tree, &options);
        collect(&resolver, &options, CompletionShell::Bash, parameter, &strings(words))
            .map(|c| c.into_iter().map(|c| c.value).collect())
    }

    #[test]
    fn provider_output_is_not_filtered() {
        assert_eq!(query("name", &["hello", "A"]).unwrap(), vec!["Karen"]);
        assert_eq!(query("--name", &["hello", "A"]).unwrap(), vec!["Karen"]);
    }

    #[test]
    fn enum_variants_filtered_by_prefix() {
        assert_eq!(query("mood", &["hello", "H"]).unwrap(), vec!["Happy", "Hungry"]);
    }

    #[test]
    fn positional_uses_static_candidates() {
        assert_eq!(query("@", &["hello", "al"]).unwrap(), vec!["alpha", "alps"]);
    }

    #[test]
    fn positional_at_group_lists_commands() {
        assert_eq!(query("@", &["k"]).unwrap(), vec!["konnichiwa"]);
        assert_eq!(query("@", &[]).unwrap(), vec!["hello", "konnichiwa"]);
    }

    #[test]
    fn unknown_parameter_is_empty() {
        assert_eq!(query("unknown-option", &["hello", "A"]).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert_eq!(
            query("name", &["unknown-command", "A"]),
            Err(CompletionError::UnknownCommand {
                path: "unknown-command".into()
            })
        );
    }

    #[test]
    fn zsh_lines_escape_colons() {
        let lines = format_candidates(
            CompletionShell::Zsh,
            &[Candidate::new("a:b", "desc"), Candidate::new("c", "")],
        );
        assert_eq!(lines, "a\\:b:desc\nc\n");
        let bash = format_candidates(CompletionShell::Bash, &[Candidate::new("a:b", "desc")]);
        assert_eq!(bash, "a:b\n");
    }
}
