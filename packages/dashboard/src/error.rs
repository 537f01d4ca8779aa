use api::ApiError;
use common::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Dashboard session has been torn down")]
    TornDown,
}

impl DashboardError {
    /// The token was rejected and the user must log in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DashboardError::Api(ApiError::Unauthorized))
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Why a solution submission did not go through.
///
/// The submitted form is only borrowed, so callers keep the user's input on
/// every variant.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Invalid solution: {0}")]
    Validation(#[from] ValidationError),

    #[error("No hackathon is currently running")]
    NoActiveHackathon,

    #[error("Submission failed: {0}")]
    Api(#[source] ApiError),
}

impl SubmitError {
    /// Whether sending the same form again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SubmitError::Api(ApiError::Unauthorized | ApiError::Forbidden) => false,
            SubmitError::Api(ApiError::Validation(_)) => false,
            SubmitError::Api(_) => true,
            SubmitError::Validation(_) | SubmitError::NoActiveHackathon => false,
        }
    }
}

impl From<ApiError> for SubmitError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Validation(v) => SubmitError::Validation(v),
            other => SubmitError::Api(other),
        }
    }
}
