//! Common error types for Agni components.

use thiserror::Error;

/// Common errors across Agni components
#[derive(Debug, Error)]
pub enum AgniError {
    /// Input refused before any work is done (blank answer, malformed body)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request could not be sent or the connection failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be parsed
    #[error("Decode error: {0}")]
    Decode(String),

    /// Remote returned a non-success status
    #[error("Rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Submission carried no attempt token
    #[error("Missing nonce")]
    MissingNonce,

    /// Attempt token was already used
    #[error("Replay detected for nonce {0}")]
    ReplayDetected(String),

    /// Nonce store or behavior log failure
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgniError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Transport(_) => 502,
            Self::Decode(_) => 502,
            Self::Rejected { status, .. } => *status,
            Self::MissingNonce => 400,
            Self::ReplayDetected(_) => 403,
            Self::Store(_) => 500,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Returns true if a later manual resubmission could succeed.
    ///
    /// Nothing retries automatically; this only informs callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Store(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// True for errors raised before any network call was attempted
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<serde_json::Error> for AgniError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
