use std::{fs, path::Path};

use serde::Deserialize;

use crate::config::ConfigError;

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestRef>,
}

#[derive(Debug, Deserialize)]
struct PullRequestRef {
    number: Option<u64>,
}

/// Read the pull request number from a workflow event payload. A payload
/// file that doesn't exist, or an event that isn't about a pull request,
/// yields `None`.
pub fn pull_request_number(path: &Path) -> Result<Option<u64>, ConfigError> {
    if !path.exists() {
        log::debug!("event payload {} does not exist", path.display());
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|err| ConfigError::Event {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let payload: EventPayload =
        serde_json::from_str(&contents).map_err(|err| ConfigError::Event {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    Ok(payload.pull_request.and_then(|pr| pr.number))
}
