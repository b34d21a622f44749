use serde::Deserialize;

use crate::{error::SourceError, review::Review};

/// A file touched by a pull request. Only the path takes part in matching.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl ChangedFile {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: None,
        }
    }
}

/// Supplies the data a check needs about one pull request. Implementations
/// do the fetching; the check itself never performs I/O beyond reading the
/// CODEOWNERS file.
pub trait PullRequestSource {
    fn changed_files(&self) -> Result<Vec<ChangedFile>, SourceError>;
    fn reviews(&self) -> Result<Vec<Review>, SourceError>;
}
