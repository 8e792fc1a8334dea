//! Error types for agenda operations.

use thiserror::Error;

/// Errors that can occur while talking to the agenda API or the session store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgendaError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("Request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The session changed while a request issued under it was in flight.
    #[error("Session changed while the request was in flight")]
    StaleSession,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl AgendaError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AgendaError::Unauthorized(_))
    }
}

impl From<reqwest::Error> for AgendaError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AgendaError::Decode(e.to_string())
        } else {
            AgendaError::Network(e.to_string())
        }
    }
}

/// Result type alias for agenda operations.
pub type AgendaResult<T> = Result<T, AgendaError>;
