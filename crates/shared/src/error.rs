use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Rejected,
    Internal,
}

impl ErrorCode {
    /// Maps an HTTP status onto an error code. A 2xx status means the server
    /// answered `result: false`, which is a plain rejection.
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => ErrorCode::Rejected,
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            400 | 409 | 422 => ErrorCode::Validation,
            _ => ErrorCode::Internal,
        }
    }
}

/// Loose shape of an error body: `{ "message": "..." }`, everything else ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
