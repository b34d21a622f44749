use std::{fs, path::Path};

use serde::Serialize;

use crate::{error::Error, ownership::OwnershipTable};

/// Parse a CODEOWNERS file from a string, returning a `ParseResult` containing
/// the parsed entries and the lines that were skipped.
pub fn parse(source: &str) -> ParseResult {
    Parser::new(source).parse()
}

/// Parse a CODEOWNERS file from a file path. A missing file is reported as
/// [`Error::MissingCodeowners`] rather than a bare I/O error.
pub fn parse_file(path: &Path) -> Result<ParseResult, Error> {
    if !path.exists() {
        return Err(Error::MissingCodeowners(path.to_path_buf()));
    }
    let source = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse(&source))
}

/// The result of parsing a CODEOWNERS file. Parsing never fails: lines that
/// can't be turned into an entry end up in `skipped` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    pub entries: Vec<OwnershipEntry>,
    pub skipped: Vec<SkippedLine>,
}

impl ParseResult {
    /// Compile the parsed entries into an [`OwnershipTable`]. Skipped lines
    /// are carried over so they can still be reported.
    pub fn into_table(self) -> OwnershipTable {
        OwnershipTable::with_skipped(self.entries, self.skipped)
    }
}

/// A single `pattern owner...` line. Owners are stored without their leading
/// `@`. Entries keep the order in which they were declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipEntry {
    pub pattern: String,
    pub owners: Vec<String>,
}

impl OwnershipEntry {
    pub fn new<I, S>(pattern: impl Into<String>, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pattern: pattern.into(),
            owners: owners.into_iter().map(Into::into).collect(),
        }
    }
}

/// A non-blank, non-comment line that didn't produce an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    pub text: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The line has a pattern but no owners. Such lines are not treated as
    /// "explicitly unowned"; they simply don't take part in matching.
    MissingOwners,
}

struct Parser<'a> {
    source: &'a str,
    skipped: Vec<SkippedLine>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            skipped: Vec::new(),
        }
    }

    fn parse(mut self) -> ParseResult {
        let mut entries = Vec::new();
        for (idx, line) in self.source.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            match parse_entry(trimmed) {
                Some(entry) => entries.push(entry),
                None => {
                    log::debug!("skipping CODEOWNERS line {}: no owners", idx + 1);
                    self.skipped.push(SkippedLine {
                        line: idx + 1,
                        text: trimmed.to_owned(),
                        reason: SkipReason::MissingOwners,
                    });
                }
            }
        }

        ParseResult {
            entries,
            skipped: self.skipped,
        }
    }
}

fn parse_entry(line: &str) -> Option<OwnershipEntry> {
    let mut tokens = line.split_whitespace();
    let pattern = tokens.next()?;
    let owners = tokens.map(parse_owner).collect::<Vec<_>>();
    if owners.is_empty() {
        return None;
    }
    Some(OwnershipEntry::new(pattern, owners))
}

// Only a single leading `@` is stripped; anything else is kept verbatim.
fn parse_owner(token: &str) -> &str {
    token.strip_prefix('@').unwrap_or(token)
}
