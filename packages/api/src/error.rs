use common::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid or expired token")]
    Unauthorized,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether retrying the same request later can succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(e) => e.is_timeout() || e.is_connect(),
            ApiError::Status { status, .. } => *status >= 500 || matches!(status, 408 | 429),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
