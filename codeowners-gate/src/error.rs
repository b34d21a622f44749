use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors surfaced while running a check. The core functions (parsing,
/// matching, reduction, decision) never fail; these only come from reading
/// inputs and from the collaborator that fetches pull request data.
#[derive(Debug, Error)]
pub enum Error {
    #[error("CODEOWNERS file not found at {}", .0.display())]
    MissingCodeowners(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid review timestamp `{value}`: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Error reported by a [`crate::PullRequestSource`] implementation.
#[derive(Debug, Error)]
#[error("failed to fetch {what}: {message}")]
pub struct SourceError {
    pub what: &'static str,
    pub message: String,
}

impl SourceError {
    pub fn new(what: &'static str, message: impl Into<String>) -> Self {
        Self {
            what,
            message: message.into(),
        }
    }
}

/// A pattern that could not be compiled into a matcher. Such patterns
/// contribute no matches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("patterns cannot contain null bytes")]
    NullByte,

    /// `expr` is the generated expression and can be large, so it stays out
    /// of the message.
    #[error("pattern does not compile: {message}")]
    Regex { expr: String, message: String },
}
