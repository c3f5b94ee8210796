//! Content error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("{service} API key is not set. Add it in settings.")]
    MissingCredential { service: &'static str },
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("{service} returned status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("{0} returned no usable content")]
    EmptyResponse(&'static str),
}

impl ContentError {
    /// Authorization failures: a missing key or a 401/403 from the service
    pub fn is_authorization(&self) -> bool {
        match self {
            ContentError::MissingCredential { .. } => true,
            ContentError::Status { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}
