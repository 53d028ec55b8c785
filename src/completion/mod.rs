//! completion
//!
//! Shell completion: static integration scripts and dynamic candidates.
//!
//! # Requests
//!
//! ```text
//! prog --completion <shell>
//! prog --completion-candidates <shell>:<param> -- <typed words...>
//! ```
//!
//! The last typed word is the in-progress token. The command path is
//! resolved from the words before it.
//!
//! # Failure policy
//!
//! - Unknown command path: error on the error sink, exit 1 (the script is
//!   out of sync with the program)
//! - Unknown parameter: no candidates, exit 0 (shells probe speculatively)

pub mod candidates;
pub mod scripts;
pub mod source;

pub use candidates::{collect, format_candidates};
pub use source::{Candidate, CandidateProvider, CandidateSource, CandidatesMetadata};

use std::fmt;

use clap::ValueEnum;
use thiserror::Error;

pub const COMPLETION: &str = "--completion";
pub const COMPLETION_CANDIDATES: &str = "--completion-candidates";

/// Errors from completion requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("Shell '{0}' is not supported for completion.")]
    UnsupportedShell(String),

    #[error("Unknown command path '{path}'.")]
    UnknownCommand { path: String },

    #[error("Malformed completion request: {0}")]
    MalformedRequest(String),
}

/// Shells with completion support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionShell {
    Bash,
    Zsh,
}

impl CompletionShell {
    /// Parse a shell identifier (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedShell` for identifiers that are not bash or zsh,
    /// including other shells `clap_complete` knows about.
    pub fn parse(id: &str) -> Result<Self, CompletionError> {
        match clap_complete::Shell::from_str(id, true) {
            Ok(clap_complete::Shell::Bash) => Ok(CompletionShell::Bash),
            Ok(clap_complete::Shell::Zsh) => Ok(CompletionShell::Zsh),
            _ => Err(CompletionError::UnsupportedShell(id.to_string())),
        }
    }
}

impl fmt::Display for CompletionShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionShell::Bash => f.write_str("bash"),
            CompletionShell::Zsh => f.write_str("zsh"),
        }
    }
}

/// A parsed completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionRequest {
    Script {
        shell: CompletionShell,
    },
    Candidates {
        shell: CompletionShell,
        parameter: String,
        words: Vec<String>,
    },
}

impl CompletionRequest {
    /// Recognize a completion request in the raw arguments.
    ///
    /// Returns `None` when the first argument is not a completion flag.
    pub fn parse(args: &[String]) -> Option<Result<Self, CompletionError>> {
        let (first, rest) = args.split_first()?;
        match first.as_str() {
            COMPLETION => Some(Self::parse_script(rest)),
            COMPLETION_CANDIDATES => Some(Self::parse_candidates(rest)),
            _ => None,
        }
    }

    fn parse_script(rest: &[String]) -> Result<Self, CompletionError> {
        let shell = rest
            .first()
            .ok_or_else(|| CompletionError::MalformedRequest("missing shell".into()))?;
        Ok(CompletionRequest::Script {
            shell: CompletionShell::parse(shell)?,
        })
    }

    fn parse_candidates(rest: &[String]) -> Result<Self, CompletionError> {
        let target = rest.first().ok_or_else(|| {
            CompletionError::MalformedRequest("expected <shell>:<parameter>".into())
        })?;
        let (shell, parameter) = target.split_once(':').ok_or_else(|| {
            CompletionError::MalformedRequest(format!("expected <shell>:<parameter>, got '{}'", target))
        })?;
        let shell = CompletionShell::parse(shell)?;

        let words = match rest.get(1).map(String::as_str) {
            Some("--") => rest[2..].to_vec(),
            None => Vec::new(),
            Some(other) => {
                return Err(CompletionError::MalformedRequest(format!(
                    "expected '--' before the command line, got '{}'",
                    other
                )))
            }
        };
        Ok(CompletionRequest::Candidates {
            shell,
            parameter: parameter.to_string(),
            words,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn shells_parse_case_insensitively() {
        assert_eq!(CompletionShell::parse("ZSH"), Ok(CompletionShell::Zsh));
        assert_eq!(CompletionShell::parse("bash"), Ok(CompletionShell::Bash));
        assert!(matches!(
            CompletionShell::parse("fish"),
            Err(CompletionError::UnsupportedShell(_))
        ));
        assert!(CompletionShell::parse("cmd").is_err());
    }

    #[test]
    fn parses_candidate_request() {
        let request = CompletionRequest::parse(&strings(&[
            "--completion-candidates",
            "bash:name",
            "--",
            "hello",
            "A",
        ]));
        assert_eq!(
            request,
            Some(Ok(CompletionRequest::Candidates {
                shell: CompletionShell::Bash,
                parameter: "name".into(),
                words: strings(&["hello", "A"]),
            }))
        );
    }

    #[test]
    fn non_completion_args_are_ignored() {
        assert_eq!(CompletionRequest::parse(&strings(&["hello", "--completion"])), None);
        assert_eq!(CompletionRequest::parse(&[]), None);
    }

    #[test]
    fn missing_separator_is_malformed() {
        let request = CompletionRequest::parse(&strings(&["--completion-candidates", "zsh:@", "x"]));
        assert!(matches!(request, Some(Err(CompletionError::MalformedRequest(_)))));
    }
}
