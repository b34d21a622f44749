//! Work out which code owners have to approve a pull request, and whether
//! they have.
//!
//! ```
//! use codeowners_gate::{approvals, decide, OwnershipTable, Review};
//!
//! let table = OwnershipTable::parse("*.rs @rustaceans\n/docs/** @docs\n");
//! let required = table.required_owners(&["src/lib.rs", "docs/index.md"]);
//!
//! let reviews = vec![Review::from_raw("rustaceans", "APPROVED", "2024-05-01T12:00:00Z").unwrap()];
//! let result = decide(&required, &approvals(&reviews));
//!
//! assert!(!result.ok);
//! assert_eq!(result.missing.into_iter().collect::<Vec<_>>(), vec!["docs"]);
//! ```

pub mod check;
mod error;
pub mod gate;
mod ownership;
pub mod parser;
mod pattern;
pub mod review;
mod source;

pub use check::{evaluate, run, CheckConfig, CheckReport, Evaluation};
pub use error::{Error, PatternError, SourceError};
pub use gate::{decide, decide_with, ApprovalPolicy, GateResult};
pub use ownership::{resolve, Diagnostics, InvalidPattern, OwnershipTable};
pub use parser::{parse, parse_file, OwnershipEntry, ParseResult, SkipReason, SkippedLine};
pub use pattern::{matches, Pattern};
pub use review::{approvals, approved_set, parse_timestamp, reduce_latest, Review, ReviewState};
pub use source::{ChangedFile, PullRequestSource};
