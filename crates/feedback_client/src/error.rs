use std::path::PathBuf;

use shared::error::ErrorCode;
use thiserror::Error;

/// Failure of a single call to the feedback service.
///
/// Controllers surface every variant through the same generic alert; the
/// distinction only reaches the logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFailure {
    #[error("failed to reach feedback service: {0}")]
    Transport(String),
    #[error("feedback service rejected request (status {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("malformed response from feedback service: {0}")]
    MalformedResponse(String),
}

impl ApiFailure {
    pub fn rejected(status: u16, message: Option<String>) -> Self {
        Self::Rejected { status, message }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            ApiFailure::Rejected { status, .. } => Some(ErrorCode::from_status(*status)),
            ApiFailure::Transport(_) | ApiFailure::MalformedResponse(_) => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiFailure::Transport(_))
    }
}

impl From<reqwest::Error> for ApiFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiFailure::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiFailure::rejected(status.as_u16(), None)
        } else {
            ApiFailure::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session storage I/O failed for '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("session storage file '{path}' is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid server url '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        source: url::ParseError,
    },
}
