use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification of a failed lookup, which decides the view shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service could not be reached or answered with something unusable.
    Transport,
    /// The service answered, but the payload carries no status.
    MalformedResult,
}

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("tracking request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("tracking service returned HTTP {0}")]
    Status(StatusCode),

    #[error("tracking response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("tracking request timed out after {0:?}")]
    Timeout(Duration),

    #[error("tracking response has no status")]
    MalformedResult,
}

impl TrackingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackingError::MalformedResult => ErrorKind::MalformedResult,
            TrackingError::Network(_)
            | TrackingError::Status(_)
            | TrackingError::Parse(_)
            | TrackingError::Timeout(_) => ErrorKind::Transport,
        }
    }
}
