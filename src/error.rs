//! Error types for the PurrPass client.

use crate::validation::FieldErrors;

/// Top-level error type for the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Validation error: {0}")]
    Validation(#[from] FieldErrors),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Errors from the REST backend or the transport underneath it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {path} failed: {reason}")]
    Transport { path: String, reason: String },

    #[error("Unauthorized request to {path}")]
    Unauthorized { path: String },

    #[error("Request to {path} returned HTTP {status}: {message}")]
    Status {
        path: String,
        status: u16,
        message: String,
    },

    #[error("Backend rejected request to {path}: {message}")]
    Rejected { path: String, message: String },

    #[error("Invalid response body from {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl ApiError {
    /// Server-supplied message, when the backend sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::Rejected { message, .. } if !message.is_empty() => {
                Some(message)
            }
            _ => None,
        }
    }
}

/// Session persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session backend {backend} failed: {reason}")]
    Backend { backend: String, reason: String },

    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a form submission.
///
/// Validation failures never reach the network; everything else happened
/// after the request was sent.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Form is invalid: {0}")]
    Invalid(#[from] FieldErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl SubmitError {
    /// Static message shown inline above the form.
    pub fn inline_message(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "Please correct the highlighted fields.",
            Self::Api(ApiError::Unauthorized { .. }) => {
                "Your session has expired. Please sign in again."
            }
            Self::Api(_) => "Something went wrong while saving. Please try again.",
            Self::Session(_) => "Could not update your session. Please try again.",
        }
    }

    /// Field-level errors, if this was a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type alias for the client.
pub type Result<T> = std::result::Result<T, Error>;
