use codeowners_gate::{ChangedFile, PullRequestSource, Review, SourceError};
use reqwest::blocking::Client;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

const PER_PAGE: usize = 100;
// The files endpoint stops at 3000 files, so 30 pages covers everything.
const MAX_PAGES: usize = 30;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid review from {reviewer}: {source}")]
    Review {
        reviewer: String,
        #[source]
        source: codeowners_gate::Error,
    },
}

/// Fetches the changed files and reviews of one pull request from the GitHub
/// REST API.
pub struct GitHubClient {
    http: Client,
    api_url: String,
    repository: String,
    token: String,
    pr_number: u64,
}

#[derive(Debug, Deserialize)]
struct ApiReview {
    user: Option<ApiUser>,
    state: String,
    submitted_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
}

impl GitHubClient {
    pub fn new(
        api_url: impl Into<String>,
        repository: impl Into<String>,
        token: impl Into<String>,
        pr_number: u64,
    ) -> Result<Self, GitHubError> {
        let http = Client::builder()
            .user_agent(concat!("codeowners-gate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            repository: repository.into(),
            token: token.into(),
            pr_number,
        })
    }

    pub fn pull_request_files(&self) -> Result<Vec<ChangedFile>, GitHubError> {
        self.get_paginated("files")
    }

    pub fn pull_request_reviews(&self) -> Result<Vec<Review>, GitHubError> {
        let reviews = self.get_paginated::<ApiReview>("reviews")?;
        let mut converted = Vec::with_capacity(reviews.len());
        for review in reviews {
            if let Some(review) = convert_review(review)? {
                converted.push(review);
            }
        }
        Ok(converted)
    }

    fn endpoint_url(&self, endpoint: &str, page: usize) -> String {
        format!(
            "{}/repos/{}/pulls/{}/{}?per_page={}&page={}",
            self.api_url.trim_end_matches('/'),
            self.repository,
            self.pr_number,
            endpoint,
            PER_PAGE,
            page
        )
    }

    fn get_paginated<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>, GitHubError> {
        let mut items = Vec::new();
        for page in 1..=MAX_PAGES {
            let url = self.endpoint_url(endpoint, page);
            log::debug!("GET {}", url);

            let response = self
                .http
                .get(&url)
                .header("Accept", "application/vnd.github+json")
                .header("X-GitHub-Api-Version", "2022-11-28")
                .bearer_auth(&self.token)
                .send()?;

            let status = response.status();
            if !status.is_success() {
                let message = response
                    .text()
                    .unwrap_or_else(|_| "unable to read response body".to_owned());
                return Err(GitHubError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let batch: Vec<T> = response.json()?;
            let more = has_more_pages(endpoint, page, batch.len());
            items.extend(batch);
            if !more {
                break;
            }
        }
        Ok(items)
    }
}

// A full page means there may be more, unless the page cap was reached.
fn has_more_pages(endpoint: &str, page: usize, batch_len: usize) -> bool {
    if batch_len < PER_PAGE {
        return false;
    }
    if page >= MAX_PAGES {
        log::warn!(
            "stopped fetching {} after {} pages; later results are ignored",
            endpoint,
            MAX_PAGES
        );
        return false;
    }
    true
}

// Pending reviews have no submission time and reviews by deleted accounts
// have no user; neither can count as an approval.
fn convert_review(review: ApiReview) -> Result<Option<Review>, GitHubError> {
    let Some(user) = review.user else {
        log::debug!("skipping {} review without a user", review.state);
        return Ok(None);
    };
    let Some(submitted_at) = review.submitted_at else {
        log::debug!("skipping unsubmitted review from {}", user.login);
        return Ok(None);
    };

    Review::from_raw(&user.login, &review.state, &submitted_at)
        .map(Some)
        .map_err(|source| GitHubError::Review {
            reviewer: user.login,
            source,
        })
}

impl PullRequestSource for GitHubClient {
    fn changed_files(&self) -> Result<Vec<ChangedFile>, SourceError> {
        self.pull_request_files()
            .map_err(|err| SourceError::new("changed files", err.to_string()))
    }

    fn reviews(&self) -> Result<Vec<Review>, SourceError> {
        self.pull_request_reviews()
            .map_err(|err| SourceError::new("reviews", err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use codeowners_gate::ReviewState;

    use super::*;

    fn api_review(json: &str) -> ApiReview {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_endpoint_url() {
        let client = GitHubClient::new("https://api.github.com/", "octo/widgets", "t", 12).unwrap();
        assert_eq!(
            client.endpoint_url("files", 2),
            "https://api.github.com/repos/octo/widgets/pulls/12/files?per_page=100&page=2"
        );
    }

    #[test]
    fn test_has_more_pages() {
        assert!(has_more_pages("reviews", 1, PER_PAGE));
        assert!(has_more_pages("reviews", MAX_PAGES - 1, PER_PAGE));
        assert!(!has_more_pages("reviews", 1, PER_PAGE - 1));
        assert!(!has_more_pages("reviews", 1, 0));
        assert!(!has_more_pages("reviews", MAX_PAGES, PER_PAGE));
    }

    #[test]
    fn test_convert_review() {
        let review = convert_review(api_review(
            r#"{"id":1,"user":{"login":"octocat","id":2},"state":"APPROVED","submitted_at":"2024-05-01T12:00:00Z"}"#,
        ))
        .unwrap()
        .unwrap();
        assert_eq!(review.reviewer, "octocat");
        assert_eq!(review.state, ReviewState::Approved);
    }

    #[test]
    fn test_skipped_reviews() {
        let pending = api_review(r#"{"user":{"login":"octocat"},"state":"PENDING"}"#);
        assert!(convert_review(pending).unwrap().is_none());

        let ghost = api_review(
            r#"{"user":null,"state":"APPROVED","submitted_at":"2024-05-01T12:00:00Z"}"#,
        );
        assert!(convert_review(ghost).unwrap().is_none());
    }

    #[test]
    fn test_bad_timestamp() {
        let review = api_review(
            r#"{"user":{"login":"octocat"},"state":"APPROVED","submitted_at":"not a date"}"#,
        );
        assert!(matches!(
            convert_review(review),
            Err(GitHubError::Review { reviewer, .. }) if reviewer == "octocat"
        ));
    }

    #[test]
    fn test_changed_file_payload() {
        let files: Vec<ChangedFile> = serde_json::from_str(
            r#"[{"sha":"abc","filename":"src/lib.rs","status":"modified","additions":1}]"#,
        )
        .unwrap();
        assert_eq!(files[0].filename, "src/lib.rs");
        assert_eq!(files[0].status.as_deref(), Some("modified"));
    }
}
