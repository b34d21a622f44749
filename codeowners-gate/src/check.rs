//! The end-to-end check: CODEOWNERS text, changed paths and reviews in, a
//! [`CheckReport`] out.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    error::Error,
    gate::{self, ApprovalPolicy, GateResult},
    ownership::{Diagnostics, OwnershipTable},
    parser,
    review::{self, Review},
    source::PullRequestSource,
};

pub const DEFAULT_CODEOWNERS_PATH: &str = ".github/CODEOWNERS";

/// Settings for a single check. Built once by the caller and passed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    pub codeowners_path: PathBuf,
    pub require_all_owners: bool,
}

impl CheckConfig {
    pub fn new(codeowners_path: impl Into<PathBuf>) -> Self {
        Self {
            codeowners_path: codeowners_path.into(),
            require_all_owners: true,
        }
    }

    pub fn require_all_owners(mut self, require_all_owners: bool) -> Self {
        self.require_all_owners = require_all_owners;
        self
    }

    pub fn policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::from_require_all(self.require_all_owners)
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CODEOWNERS_PATH)
    }
}

/// The gate verdict together with whatever was dropped along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub gate: GateResult,
    pub diagnostics: Diagnostics,
}

/// Run the whole pipeline over data that has already been fetched.
pub fn evaluate<S: AsRef<str> + Sync>(
    codeowners: &str,
    changed_paths: &[S],
    reviews: &[Review],
    policy: ApprovalPolicy,
) -> Evaluation {
    let table = OwnershipTable::parse(codeowners);
    let required = table.required_owners(changed_paths);
    let approved = review::approvals(reviews);
    Evaluation {
        gate: gate::decide_with(policy, &required, &approved),
        diagnostics: table.diagnostics().clone(),
    }
}

/// Structured result of a check, serialized as the tool's JSON output. Sets
/// are sorted, so the same inputs always produce the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_owners: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approvals: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_approvals: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Diagnostics::is_empty")]
    pub diagnostics: Diagnostics,
}

impl CheckReport {
    /// A failed check that never reached a verdict.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(message.into()),
            required_owners: None,
            approvals: None,
            missing_approvals: None,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn from_gate(gate: GateResult, diagnostics: Diagnostics) -> Self {
        if gate.required.is_empty() {
            return Self {
                success: gate.ok,
                message: Some(gate.detail),
                error: None,
                required_owners: None,
                approvals: None,
                missing_approvals: None,
                diagnostics,
            };
        }

        Self {
            success: gate.ok,
            message: Some(gate.detail),
            error: None,
            required_owners: Some(gate.required),
            approvals: Some(gate.approved),
            missing_approvals: (!gate.missing.is_empty()).then_some(gate.missing),
            diagnostics,
        }
    }
}

/// Check a pull request fetched through `source` against the CODEOWNERS
/// file named in `config`. Never fails: every problem ends up in the report.
pub fn run(config: &CheckConfig, source: &(impl PullRequestSource + ?Sized)) -> CheckReport {
    if !config.codeowners_path.exists() {
        let err = Error::MissingCodeowners(config.codeowners_path.clone());
        log::error!("{}", err);
        return CheckReport::error(err.to_string());
    }

    match try_run(config, source) {
        Ok(report) => report,
        Err(err) => {
            log::error!("error checking approvals: {}", err);
            CheckReport::error(format!("Error checking approvals: {}", err))
        }
    }
}

fn try_run(
    config: &CheckConfig,
    source: &(impl PullRequestSource + ?Sized),
) -> Result<CheckReport, Error> {
    let policy = config.policy();

    let changed_files = source.changed_files()?;
    log::info!("PR has {} changed files", changed_files.len());

    let table = load_table(&config.codeowners_path)?;
    let paths = changed_files
        .iter()
        .map(|file| file.filename.as_str())
        .collect::<Vec<_>>();
    let required = table.required_owners(&paths);
    let diagnostics = table.diagnostics().clone();

    if required.is_empty() {
        log::info!("{}", gate::NO_OWNERS_REQUIRED);
        let gate = gate::decide_with(policy, &required, &BTreeSet::new());
        return Ok(CheckReport::from_gate(gate, diagnostics));
    }
    log::info!("Required approvals from: {}", join(&required));

    let reviews = source.reviews()?;
    let approved = review::approvals(&reviews);
    log::info!(
        "PR has approvals from: {}",
        if approved.is_empty() {
            "none".to_owned()
        } else {
            join(&approved)
        }
    );

    let gate = gate::decide_with(policy, &required, &approved);
    if !gate.ok {
        log::warn!("Missing approvals from: {}", join(&gate.missing));
    }
    Ok(CheckReport::from_gate(gate, diagnostics))
}

fn load_table(path: &Path) -> Result<OwnershipTable, Error> {
    let result = parser::parse_file(path)?;
    log::debug!(
        "parsed {} CODEOWNERS entries from {} ({} lines skipped)",
        result.entries.len(),
        path.display(),
        result.skipped.len()
    );
    Ok(result.into_table())
}

fn join(owners: &BTreeSet<String>) -> String {
    owners.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
