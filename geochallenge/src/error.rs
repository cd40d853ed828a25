//! Error types.

#[derive(thiserror::Error, Debug)]
pub enum GeoChallengeError {
    #[error("Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Unexpected response from {source_name}: {reason}")]
    UnexpectedResponse { source_name: String, reason: String },
    #[error("Invalid country code: {0:?}")]
    InvalidCountryCode(String),
}

pub type GeoChallengeResult<T> = Result<T, GeoChallengeError>;
