//! Error types for the DNS records viewer
//!
//! Every failure a gateway can produce is converted into one of the
//! [`Error::Network`], [`Error::Http`], [`Error::Parse`] or
//! [`Error::Submission`] kinds before it reaches the controller.

use thiserror::Error;

/// Result type alias for viewer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message used when a submission fails without a service-supplied reason
pub const DEFAULT_SUBMISSION_MESSAGE: &str = "Domain is invalid or not responding";

/// Core error type for the viewer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The transport could not complete the request
    #[error("Network error: {0}")]
    Network(String),

    /// The records service answered with a non-success status
    #[error("HTTP error {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Message from the error body, or a status-derived fallback
        message: String,
    },

    /// A success body could not be decoded into a dataset
    #[error("Failed to parse JSON: {raw_body}")]
    Parse {
        /// The body exactly as received
        raw_body: String,
    },

    /// A resolution request did not succeed
    #[error("Submission failed: {message}")]
    Submission {
        /// User-facing reason
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an HTTP status error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create an HTTP status error with the generic status-derived message
    pub fn http_status(status: u16) -> Self {
        Self::http(status, format!("HTTP error! Status: {}", status))
    }

    /// Create a parse error carrying the offending body
    pub fn parse(raw_body: impl Into<String>) -> Self {
        Self::Parse {
            raw_body: raw_body.into(),
        }
    }

    /// Create a submission error
    pub fn submission(message: impl Into<String>) -> Self {
        Self::Submission {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Text shown to the user when this error puts the view into the error phase
    pub fn user_message(&self) -> String {
        match self {
            Error::Http { message, .. } => message.clone(),
            Error::Submission { message } => message.clone(),
            Error::Network(_) => "Could not reach the records service".to_string(),
            Error::Parse { raw_body } => format!("Failed to parse JSON: {}", raw_body),
            other => other.to_string(),
        }
    }

    /// Whether this error belongs to the gateway taxonomy
    pub fn is_gateway_failure(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Http { .. } | Error::Parse { .. } | Error::Submission { .. }
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
