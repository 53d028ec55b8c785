//! completion::source
//!
//! Where a parameter's completion candidates come from.

use std::fmt;
use std::sync::Arc;

use super::CompletionShell;
use crate::parse::ParsedCommandLine;

/// A completion value with an optional description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub value: String,
    pub description: String,
}

impl Candidate {
    pub fn new(value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: description.into(),
        }
    }
}

/// What is being completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatesMetadata {
    pub shell: CompletionShell,
    /// Path of the resolved command.
    pub command_path: Vec<String>,
    /// Option long name, argument name, or `@` for the current positional.
    pub parameter: String,
    /// The in-progress token.
    pub partial: String,
}

/// Computes candidates when completion is requested.
///
/// Output is emitted as-is; providers filter by `metadata.partial`
/// themselves if they want to.
pub trait CandidateProvider: Send + Sync {
    fn get_candidates(
        &self,
        metadata: &CandidatesMetadata,
        parsed: &ParsedCommandLine,
    ) -> Vec<Candidate>;
}

impl<F> CandidateProvider for F
where
    F: Fn(&CandidatesMetadata, &ParsedCommandLine) -> Vec<Candidate> + Send + Sync,
{
    fn get_candidates(
        &self,
        metadata: &CandidatesMetadata,
        parsed: &ParsedCommandLine,
    ) -> Vec<Candidate> {
        self(metadata, parsed)
    }
}

/// Candidate source attached to a parameter.
#[derive(Clone)]
pub enum CandidateSource {
    /// Fixed values, filtered by prefix of the partial token.
    Static(Vec<Candidate>),
    /// Computed on the fly.
    Provider(Arc<dyn CandidateProvider>),
}

impl CandidateSource {
    pub fn provider(provider: impl CandidateProvider + 'static) -> Self {
        CandidateSource::Provider(Arc::new(provider))
    }
}

impl fmt::Debug for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::Static(values) => f.debug_tuple("Static").field(values).finish(),
            CandidateSource::Provider(_) => f.write_str("Provider"),
        }
    }
}
