use reqwest::StatusCode;
use shared::domain::FormError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {payload}")]
    Status { status: StatusCode, payload: String },
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ResourceError {
    /// Text suitable for showing to the user: the server's error payload when
    /// there is one.
    pub fn payload(&self) -> String {
        match self {
            Self::Status { payload, .. } if !payload.is_empty() => payload.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("invalid study input: {0}")]
    Form(#[from] FormError),
    #[error("prompt failed: {0}")]
    Prompt(#[from] std::io::Error),
    #[error("no study at index {index} (list has {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("study at index {index} has not been saved yet")]
    MissingId { index: usize },
}
