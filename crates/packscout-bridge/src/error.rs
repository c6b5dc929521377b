//! Bridge client errors

use packscout_core::DomainError;
use thiserror::Error;

/// Error type for bridge requests
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Invalid bridge URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bridge returned status {status} for {endpoint}")]
    Status { status: u16, endpoint: String },
}

/// Result type for bridge requests
pub type BridgeResult<T> = Result<T, BridgeError>;

impl From<BridgeError> for DomainError {
    fn from(err: BridgeError) -> Self {
        DomainError::Transport(err.to_string())
    }
}
