use std::collections::BTreeSet;

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    parser::{self, OwnershipEntry, SkippedLine},
    pattern::Pattern,
};

/// Parsed CODEOWNERS entries with their patterns compiled. Every entry whose
/// pattern matches a path contributes its owners; later entries don't
/// override earlier ones.
#[derive(Debug, Clone)]
pub struct OwnershipTable {
    entries: Vec<OwnershipEntry>,
    // `None` for patterns that failed to compile.
    patterns: Vec<Option<Pattern>>,
    diagnostics: Diagnostics,
}

/// Lines and patterns that were dropped while building a table. None of
/// these stop a check from running.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_patterns: Vec<InvalidPattern>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.skipped_lines.is_empty() && self.invalid_patterns.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidPattern {
    pub pattern: String,
    pub message: String,
}

impl OwnershipTable {
    pub fn new(entries: Vec<OwnershipEntry>) -> Self {
        Self::with_skipped(entries, Vec::new())
    }

    /// Parse CODEOWNERS text and compile it in one go.
    pub fn parse(source: &str) -> Self {
        parser::parse(source).into_table()
    }

    pub(crate) fn with_skipped(entries: Vec<OwnershipEntry>, skipped: Vec<SkippedLine>) -> Self {
        let mut invalid_patterns = Vec::new();
        let patterns = entries
            .iter()
            .map(|entry| match Pattern::new(&entry.pattern) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    log::warn!(
                        "ignoring invalid pattern `{}`: {}",
                        entry.pattern.escape_debug(),
                        err
                    );
                    invalid_patterns.push(InvalidPattern {
                        pattern: entry.pattern.clone(),
                        message: err.to_string(),
                    });
                    None
                }
            })
            .collect();

        Self {
            entries,
            patterns,
            diagnostics: Diagnostics {
                skipped_lines: skipped,
                invalid_patterns,
            },
        }
    }

    pub fn entries(&self) -> &[OwnershipEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// All entries whose pattern matches `path`, with their index in the
    /// table, in declaration order.
    pub fn matching_entries(&self, path: &str) -> Vec<(usize, &OwnershipEntry)> {
        self.entries
            .iter()
            .zip(&self.patterns)
            .enumerate()
            .filter_map(|(idx, (entry, pattern))| {
                let pattern = pattern.as_ref()?;
                pattern.is_match(path).then_some((idx, entry))
            })
            .collect()
    }

    /// The union of the owners of every entry matching any of `paths`.
    #[cfg(not(feature = "rayon"))]
    pub fn required_owners<S: AsRef<str> + Sync>(&self, paths: &[S]) -> BTreeSet<String> {
        paths
            .iter()
            .flat_map(|path| self.owners_for(path.as_ref()))
            .map(str::to_owned)
            .collect()
    }

    /// The union of the owners of every entry matching any of `paths`.
    #[cfg(feature = "rayon")]
    pub fn required_owners<S: AsRef<str> + Sync>(&self, paths: &[S]) -> BTreeSet<String> {
        paths
            .par_iter()
            .flat_map_iter(|path| self.owners_for(path.as_ref()))
            .map(str::to_owned)
            .collect()
    }

    fn owners_for(&self, path: &str) -> Vec<&str> {
        self.matching_entries(path)
            .into_iter()
            .flat_map(|(_, entry)| entry.owners.iter().map(String::as_str))
            .collect()
    }
}

/// Resolve the owners required to approve a change touching `paths`.
pub fn resolve<S: AsRef<str> + Sync>(paths: &[S], table: &OwnershipTable) -> BTreeSet<String> {
    table.required_owners(paths)
}
