use std::path::PathBuf;

use clap::{Parser, Subcommand};
use codeowners_gate::{check::DEFAULT_CODEOWNERS_PATH, CheckConfig};
use thiserror::Error;

use crate::event;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Check that every code owner of the files changed in a pull request has
/// approved it.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// GitHub API token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository in `owner/repo` form.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Workflow event payload to read the pull request number from.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Pull request number. Takes precedence over the event payload.
    #[arg(long = "pr")]
    pub pr_number: Option<u64>,

    /// CODEOWNERS file to check against.
    #[arg(
        short = 'f',
        long = "file",
        env = "CODEOWNERS_PATH",
        default_value = DEFAULT_CODEOWNERS_PATH,
        global = true
    )]
    pub codeowners_file: PathBuf,

    /// Require every matched owner to approve, rather than any one of them.
    /// An empty value keeps the default.
    #[arg(
        long,
        env = "REQUIRE_ALL_OWNERS",
        value_name = "BOOL",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = parse_switch
    )]
    pub require_all_owners: bool,

    /// Base URL of the GitHub REST API.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the CODEOWNERS entries matching each path. Needs no token or
    /// pull request.
    Owners {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

/// Problems with the tool's inputs, detected before any check runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GITHUB_TOKEN is required")]
    MissingToken,

    #[error("GITHUB_REPOSITORY is required")]
    MissingRepository,

    #[error("invalid repository `{0}`, expected `owner/repo`")]
    InvalidRepository(String),

    #[error("Pull request number not found")]
    MissingPullRequest,

    #[error("failed to read event payload {}: {message}", path.display())]
    Event { path: PathBuf, message: String },
}

/// Everything a run needs, validated.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: String,
    pub repository: String,
    pub pr_number: u64,
    pub api_url: String,
    pub check: CheckConfig,
}

impl Cli {
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let token = non_empty(&self.token).ok_or(ConfigError::MissingToken)?;
        let repository = non_empty(&self.repository).ok_or(ConfigError::MissingRepository)?;
        if !is_repository_id(repository) {
            return Err(ConfigError::InvalidRepository(repository.to_owned()));
        }

        let pr_number = match (self.pr_number, &self.event_path) {
            (Some(number), _) => Some(number),
            (None, Some(path)) => event::pull_request_number(path)?,
            (None, None) => None,
        }
        .ok_or(ConfigError::MissingPullRequest)?;

        Ok(Settings {
            token: token.to_owned(),
            repository: repository.to_owned(),
            pr_number,
            api_url: self.api_url.clone(),
            check: CheckConfig::new(&self.codeowners_file)
                .require_all_owners(self.require_all_owners),
        })
    }
}

// Workflow inputs that were never set arrive as empty strings and keep the
// default.
fn parse_switch(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        other => Err(format!("expected `true` or `false`, got `{}`", other)),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn is_repository_id(repository: &str) -> bool {
    matches!(
        repository.split_once('/'),
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/')
    )
}
