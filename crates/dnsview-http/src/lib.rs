// # HTTP Records Gateway
//
// This crate provides the HTTP implementation of `RecordsGateway`.
//
// ## Endpoints
//
// - `GET {base_url}/dns-records`: the dataset as a JSON object, or a status
//   >= 400 with an optional `{"error": "..."}` body
// - `POST {base_url}/resolve` with `{"domain": "..."}`: replies
//   `{"status": "success" | ..., "message"?: "..."}`
//
// ## Failure mapping
//
// | Situation                         | load_dataset   | submit_domain |
// |-----------------------------------|----------------|---------------|
// | Connect/send/read failure         | Network        | Submission    |
// | Non-2xx status                    | Http           | Submission    |
// | 2xx body that does not decode     | Parse          | Submission    |
// | 2xx body with status != "success" | -              | Submission    |
//
// One request per call. No retries, no caching, no background tasks.

use async_trait::async_trait;
use dnsview_core::config::EndpointConfig;
use dnsview_core::traits::RecordsGateway;
use dnsview_core::{Dataset, Error, Result, SubmissionOutcome, SubmissionRequest};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;

/// Message for submissions that never got a usable answer
pub const SUBMISSION_TRANSPORT_MESSAGE: &str = "Could not resolve the domain";

/// Error body sent by the records service
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Extract the `error` field from a failure body, if there is a non-empty one
fn error_body_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body.trim())
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
}

/// Map a non-success dataset response to `Error::Http`
fn http_failure(status: StatusCode, body: &str) -> Error {
    match error_body_message(body) {
        Some(message) => Error::http(status.as_u16(), message),
        None => Error::http_status(status.as_u16()),
    }
}

/// HTTP gateway to the records service
#[derive(Debug, Clone)]
pub struct HttpGateway {
    /// Full URL of the dataset endpoint
    records_url: String,

    /// Full URL of the resolve endpoint
    resolve_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpGateway {
    /// Create a gateway for the configured endpoints
    ///
    /// # Returns
    ///
    /// - `Ok(HttpGateway)`: Ready to use
    /// - `Err(Error::Config)`: The endpoint configuration is invalid or the
    ///   HTTP client could not be built
    pub fn new(endpoint: &EndpointConfig) -> Result<Self> {
        endpoint.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = endpoint.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            records_url: endpoint.records_url(),
            resolve_url: endpoint.resolve_url(),
            client,
        })
    }

    /// Full URL of the dataset endpoint
    pub fn records_url(&self) -> &str {
        &self.records_url
    }

    /// Full URL of the resolve endpoint
    pub fn resolve_url(&self) -> &str {
        &self.resolve_url
    }
}

#[async_trait]
impl RecordsGateway for HttpGateway {
    async fn load_dataset(&self) -> Result<Dataset> {
        tracing::debug!("Fetching dataset from {}", self.records_url);

        let response = self
            .client
            .get(&self.records_url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Dataset request failed: {}", e);
                Error::network(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::warn!("Records service returned {}", status);
            return Err(http_failure(status, &body));
        }

        let dataset = Dataset::from_json(&body)?;
        tracing::debug!(
            "Fetched {} name server(s), {} host(s)",
            dataset.name_server_count(),
            dataset.host_count()
        );
        Ok(dataset)
    }

    async fn submit_domain(&self, request: &SubmissionRequest) -> Result<()> {
        tracing::info!(
            "Requesting resolution of {} at {}",
            request.domain(),
            self.resolve_url
        );

        let response = self
            .client
            .post(&self.resolve_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Resolve request failed: {}", e);
                Error::submission(SUBMISSION_TRANSPORT_MESSAGE)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::warn!("Failed to read resolve response: {}", e);
            Error::submission(SUBMISSION_TRANSPORT_MESSAGE)
        })?;

        if !status.is_success() {
            tracing::warn!("Resolve endpoint returned {}", status);
            let message = error_body_message(&body).unwrap_or_else(|| {
                format!("Resolution request failed with status {}", status.as_u16())
            });
            return Err(Error::submission(message));
        }

        let outcome = SubmissionOutcome::from_json(&body).map_err(|_| {
            tracing::warn!("Unexpected resolve response: {}", body);
            Error::submission(SUBMISSION_TRANSPORT_MESSAGE)
        })?;

        if !outcome.is_success() {
            tracing::info!("Service declined to resolve {}", request.domain());
        }
        outcome.into_result()
    }

    fn gateway_name(&self) -> &'static str {
        "http"
    }
}
