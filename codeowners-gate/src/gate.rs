use std::collections::BTreeSet;

use serde::Serialize;

pub const NO_OWNERS_REQUIRED: &str = "No code owners required for the changed files";
pub const ALL_OWNERS_APPROVED: &str = "All required code owners have approved this PR";

/// How many of the required owners have to approve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalPolicy {
    /// Every required owner must approve.
    #[default]
    AllOwners,
    /// A single approval from any required owner is enough.
    AnyOwner,
}

impl ApprovalPolicy {
    pub fn from_require_all(require_all_owners: bool) -> Self {
        if require_all_owners {
            Self::AllOwners
        } else {
            Self::AnyOwner
        }
    }
}

/// The outcome of comparing required owners against approvals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateResult {
    pub ok: bool,
    pub required: BTreeSet<String>,
    pub approved: BTreeSet<String>,
    pub missing: BTreeSet<String>,
    pub detail: String,
}

/// Decide whether every required owner has approved.
pub fn decide(required: &BTreeSet<String>, approved: &BTreeSet<String>) -> GateResult {
    decide_with(ApprovalPolicy::AllOwners, required, approved)
}

/// Decide under the given policy. `missing` always lists every required
/// owner without an approval, even when the policy lets the gate pass.
pub fn decide_with(
    policy: ApprovalPolicy,
    required: &BTreeSet<String>,
    approved: &BTreeSet<String>,
) -> GateResult {
    if required.is_empty() {
        return GateResult {
            ok: true,
            required: BTreeSet::new(),
            approved: approved.clone(),
            missing: BTreeSet::new(),
            detail: NO_OWNERS_REQUIRED.to_owned(),
        };
    }

    let missing: BTreeSet<String> = required.difference(approved).cloned().collect();
    let ok = match policy {
        ApprovalPolicy::AllOwners => missing.is_empty(),
        ApprovalPolicy::AnyOwner => missing.len() < required.len(),
    };

    let summary = format!(
        "Required: {}. Approved: {}.",
        join(required),
        join(approved)
    );
    let detail = if missing.is_empty() {
        format!("{}. {}", ALL_OWNERS_APPROVED, summary)
    } else if ok {
        format!(
            "Approved by a required code owner; still missing approvals from: {}. {}",
            join(&missing),
            summary
        )
    } else {
        format!("Missing approvals from: {}. {}", join(&missing), summary)
    };

    GateResult {
        ok,
        required: required.clone(),
        approved: approved.clone(),
        missing,
        detail,
    }
}

fn join(owners: &BTreeSet<String>) -> String {
    if owners.is_empty() {
        return "none".to_owned();
    }
    owners.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_owner() {
        let result = decide(
            &set(&["frontend-team", "security-team", "lead-developer"]),
            &set(&["frontend-team", "lead-developer"]),
        );
        assert!(!result.ok);
        assert_eq!(result.missing, set(&["security-team"]));
        assert_eq!(
            result.detail,
            "Missing approvals from: security-team. \
             Required: frontend-team, lead-developer, security-team. \
             Approved: frontend-team, lead-developer."
        );
    }

    #[test]
    fn test_nothing_required() {
        for approved in [set(&[]), set(&["someone"])] {
            let result = decide(&set(&[]), &approved);
            assert!(result.ok);
            assert!(result.missing.is_empty());
            assert_eq!(result.detail, NO_OWNERS_REQUIRED);
        }
    }

    #[test]
    fn test_all_approved() {
        let result = decide(&set(&["a", "b"]), &set(&["a", "b", "c"]));
        assert!(result.ok);
        assert!(result.missing.is_empty());
        assert_eq!(
            result.detail,
            "All required code owners have approved this PR. Required: a, b. Approved: a, b, c."
        );
        assert_ne!(result.detail, NO_OWNERS_REQUIRED);
    }

    #[test]
    fn test_no_approvals() {
        let result = decide(&set(&["a"]), &set(&[]));
        assert!(!result.ok);
        assert_eq!(
            result.detail,
            "Missing approvals from: a. Required: a. Approved: none."
        );
    }

    #[test]
    fn test_any_owner_policy() {
        let required = set(&["a", "b"]);

        let partial = decide_with(ApprovalPolicy::AnyOwner, &required, &set(&["b"]));
        assert!(partial.ok);
        assert_eq!(partial.missing, set(&["a"]));

        let none = decide_with(ApprovalPolicy::AnyOwner, &required, &set(&["c"]));
        assert!(!none.ok);
        assert_eq!(none.missing, required);

        let empty = decide_with(ApprovalPolicy::AnyOwner, &set(&[]), &set(&[]));
        assert!(empty.ok);
        assert_eq!(empty.detail, NO_OWNERS_REQUIRED);
    }

    #[test]
    fn test_policy_from_flag() {
        assert_eq!(ApprovalPolicy::from_require_all(true), ApprovalPolicy::AllOwners);
        assert_eq!(ApprovalPolicy::from_require_all(false), ApprovalPolicy::AnyOwner);
        assert_eq!(ApprovalPolicy::default(), ApprovalPolicy::AllOwners);
    }
}
