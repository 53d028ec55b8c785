//! parse::tokenizer
//!
//! # Rules
//!
//! - `--name=value` splits at the first `=`
//! - `--name` takes the next token as its value unless it is a flag
//! - `-x` is a short alias; `-abc` is rejected
//! - `--` ends option parsing and is not passed through
//! - After a stop-parsing option, every remaining token is positional
//! - `-` and negative numbers are positional
//! - Unknown dash-prefixed tokens are kept as unknown options

use super::{OptionTable, ParsedCommandLine, ParsedOption, SyntaxError};

/// Tokenize `tokens` against the options a command accepts.
///
/// # Errors
///
/// Returns `SyntaxError` for clustered short options, an empty option
/// name, or a value-taking option at the end of input.
///
/// # Example
///
/// ```
/// use trellis::parse::{tokenize, OptionSpec, OptionTable};
///
/// let mut table = OptionTable::new();
/// table.push(OptionSpec::flag("verbose").with_short('v'));
///
/// let tokens: Vec<String> = ["-v", "a", "--", "--b"].iter().map(|s| s.to_string()).collect();
/// let parsed = tokenize(&tokens, &table).unwrap();
/// assert!(parsed.has("verbose"));
/// assert_eq!(parsed.arguments(), ["a", "--b"]);
/// assert_eq!(parsed.terminator(), Some(1));
/// ```
pub fn tokenize(tokens: &[String], table: &OptionTable) -> Result<ParsedCommandLine, SyntaxError> {
    let mut parsed = ParsedCommandLine::default();
    let mut positional_only = false;
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];
        let position = index;
        index += 1;

        if positional_only {
            parsed.arguments.push(token.clone());
            continue;
        }

        if token == "--" {
            tracing::trace!(position, "terminator");
            parsed.terminator = Some(parsed.arguments.len());
            positional_only = true;
            continue;
        }

        if let Some(body) = token.strip_prefix("--") {
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (body, None),
            };
            if name.is_empty() {
                return Err(SyntaxError::EmptyOptionName {
                    token: token.clone(),
                });
            }

            let Some(spec) = table.long(name) else {
                tracing::trace!(position, option = name, "unknown long option");
                parsed.unknown_options.push(ParsedOption {
                    name: format!("--{}", name),
                    value: inline,
                    position,
                });
                continue;
            };

            let value = match inline {
                Some(value) => Some(value),
                None if spec.is_flag => None,
                None => {
                    let value = tokens
                        .get(index)
                        .ok_or_else(|| SyntaxError::MissingValue {
                            option: spec.name.clone(),
                        })?;
                    index += 1;
                    Some(value.clone())
                }
            };
            parsed.options.push(ParsedOption {
                name: spec.name.clone(),
                value,
                position,
            });
            if spec.stop_parsing {
                tracing::trace!(position, option = %spec.name, "stop parsing");
                positional_only = true;
            }
            continue;
        }

        if let Some(rest) = token.strip_prefix('-') {
            if rest.is_empty() || is_negative_number(token) {
                parsed.arguments.push(token.clone());
                continue;
            }

            let mut chars = rest.chars();
            let (Some(alias), None) = (chars.next(), chars.next()) else {
                return Err(SyntaxError::ClusteredShortOptions {
                    token: token.clone(),
                });
            };

            let Some(spec) = table.short(alias) else {
                tracing::trace!(position, alias = %alias, "unknown short option");
                parsed.unknown_options.push(ParsedOption {
                    name: token.clone(),
                    value: None,
                    position,
                });
                continue;
            };

            let value = if spec.is_flag {
                None
            } else {
                let value = tokens.get(index).ok_or_else(|| SyntaxError::MissingValue {
                    option: spec.name.clone(),
                })?;
                index += 1;
                Some(value.clone())
            };
            parsed.options.push(ParsedOption {
                name: spec.name.clone(),
                value,
                position,
            });
            if spec.stop_parsing {
                positional_only = true;
            }
            continue;
        }

        parsed.arguments.push(token.clone());
    }

    Ok(parsed)
}

fn is_negative_number(token: &str) -> bool {
    let numeric_start = token[1..].starts_with(|c: char| c.is_ascii_digit() || c == '.');
    numeric_start && token.parse::<f64>().is_ok()
}
