//! Resolution request and outcome types for `POST /resolve`

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DEFAULT_SUBMISSION_MESSAGE, Error, Result};

/// A domain to resolve
///
/// The domain is always trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRequest {
    domain: String,
}

impl SubmissionRequest {
    /// Build a request from raw user input
    ///
    /// # Returns
    ///
    /// - `Ok(SubmissionRequest)`: The trimmed domain is non-empty
    /// - `Err(Error::InvalidInput)`: The input is empty or whitespace only
    pub fn new(raw: &str) -> Result<Self> {
        let domain = raw.trim();
        if domain.is_empty() {
            return Err(Error::invalid_input("Domain cannot be empty"));
        }

        Ok(Self {
            domain: domain.to_string(),
        })
    }

    /// The trimmed domain
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// JSON body sent to the resolve endpoint
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::Other(format!("Failed to encode request: {}", e)))
    }
}

/// Outcome reported by the resolution service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The domain was resolved and the dataset may have changed
    Success,
    /// The service declined or failed to resolve the domain
    Failure {
        /// Reason given by the service, if any
        message: Option<String>,
    },
}

#[derive(Deserialize)]
struct OutcomeBody {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl SubmissionOutcome {
    /// Decode a resolve response body
    pub fn from_json(body: &str) -> Result<Self> {
        let parsed: OutcomeBody = serde_json::from_str(body.trim()).map_err(|e| {
            debug!("Outcome body rejected: {}", e);
            Error::parse(body)
        })?;

        if parsed.status == "success" {
            return Ok(SubmissionOutcome::Success);
        }

        let message = parsed
            .message
            .or(parsed.error)
            .filter(|m| !m.trim().is_empty());
        Ok(SubmissionOutcome::Failure { message })
    }

    /// Whether the service reported success
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success)
    }

    /// Convert to the gateway result, mapping failure to [`Error::Submission`]
    pub fn into_result(self) -> Result<()> {
        match self {
            SubmissionOutcome::Success => Ok(()),
            SubmissionOutcome::Failure { message } => Err(Error::submission(
                message.unwrap_or_else(|| DEFAULT_SUBMISSION_MESSAGE.to_string()),
            )),
        }
    }
}
