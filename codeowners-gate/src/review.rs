use std::{
    collections::{BTreeMap, BTreeSet},
    convert::Infallible,
    fmt,
    str::FromStr,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The state a review was submitted with. Only [`ReviewState::Approved`]
/// counts towards approval; the states are compared exactly, so `approved`
/// in lower case is not an approval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    Other(String),
}

impl ReviewState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Approved => "APPROVED",
            Self::ChangesRequested => "CHANGES_REQUESTED",
            Self::Commented => "COMMENTED",
            Self::Dismissed => "DISMISSED",
            Self::Pending => "PENDING",
            Self::Other(state) => state,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl From<&str> for ReviewState {
    fn from(state: &str) -> Self {
        match state {
            "APPROVED" => Self::Approved,
            "CHANGES_REQUESTED" => Self::ChangesRequested,
            "COMMENTED" => Self::Commented,
            "DISMISSED" => Self::Dismissed,
            "PENDING" => Self::Pending,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for ReviewState {
    fn from(state: String) -> Self {
        Self::from(state.as_str())
    }
}

impl From<ReviewState> for String {
    fn from(state: ReviewState) -> Self {
        state.as_str().to_owned()
    }
}

impl FromStr for ReviewState {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted pull request review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer: String,
    pub state: ReviewState,
    pub submitted_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        reviewer: impl Into<String>,
        state: impl Into<ReviewState>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            reviewer: reviewer.into(),
            state: state.into(),
            submitted_at,
        }
    }

    /// Build a review from the raw strings a review API hands back, e.g.
    /// `("octocat", "APPROVED", "2024-05-01T12:00:00Z")`.
    pub fn from_raw(reviewer: &str, state: &str, submitted_at: &str) -> Result<Self, Error> {
        Ok(Self::new(reviewer, state, parse_timestamp(submitted_at)?))
    }
}

/// Parse an RFC 3339 timestamp (such as `2024-05-01T12:00:00Z`) into a UTC
/// instant.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|source| Error::Timestamp {
            value: value.to_owned(),
            source,
        })
}

/// Keep only the latest review of each reviewer.
///
/// A later review replaces the retained one only if its timestamp is strictly
/// greater. When two reviews from the same reviewer share a timestamp, the
/// one that comes first in `reviews` wins.
pub fn reduce_latest(reviews: &[Review]) -> BTreeMap<&str, &Review> {
    let mut latest: BTreeMap<&str, &Review> = BTreeMap::new();
    for review in reviews {
        let newer = latest
            .get(review.reviewer.as_str())
            .map_or(true, |current| review.submitted_at > current.submitted_at);
        if newer {
            latest.insert(&review.reviewer, review);
        }
    }
    latest
}

/// Reviewers whose latest review is an approval.
pub fn approved_set(latest: &BTreeMap<&str, &Review>) -> BTreeSet<String> {
    latest
        .iter()
        .filter(|(_, review)| review.state.is_approved())
        .map(|(&reviewer, _)| reviewer.to_owned())
        .collect()
}

/// Shorthand for [`reduce_latest`] followed by [`approved_set`].
pub fn approvals(reviews: &[Review]) -> BTreeSet<String> {
    approved_set(&reduce_latest(reviews))
}
