//! Configuration types for the records viewer
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Records service endpoints
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Controller settings
    #[serde(default)]
    pub controller: ControllerConfig,
}

impl ClientConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.endpoint.validate()?;
        self.controller.validate()?;
        Ok(())
    }
}

/// Location of the records service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Scheme, host and port of the service (e.g., "http://localhost:8080")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path serving the dataset
    #[serde(default = "default_records_path")]
    pub records_path: String,

    /// Path accepting resolution requests
    #[serde(default = "default_resolve_path")]
    pub resolve_path: String,

    /// Per-request timeout in seconds
    ///
    /// `None` waits indefinitely; a silent service then leaves the view in
    /// its loading or submitting phase.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl EndpointConfig {
    /// Create an endpoint configuration for a base URL with default paths
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Validate the endpoint configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.base_url.is_empty() {
            return Err(crate::Error::config("Base URL cannot be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "Base URL must use HTTP or HTTPS scheme. Got: {}",
                self.base_url
            )));
        }

        for (name, path) in [
            ("Records path", &self.records_path),
            ("Resolve path", &self.resolve_path),
        ] {
            if !path.starts_with('/') {
                return Err(crate::Error::config(format!(
                    "{} must start with '/'. Got: {}",
                    name, path
                )));
            }
        }

        if self.timeout_secs == Some(0) {
            return Err(crate::Error::config("Request timeout must be > 0 when set"));
        }

        Ok(())
    }

    /// Full URL of the records endpoint
    pub fn records_url(&self) -> String {
        join_url(&self.base_url, &self.records_path)
    }

    /// Full URL of the resolve endpoint
    pub fn resolve_url(&self) -> String {
        join_url(&self.base_url, &self.resolve_path)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            records_path: default_records_path(),
            resolve_path: default_resolve_path(),
            timeout_secs: None,
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_records_path() -> String {
    "/dns-records".to_string()
}

fn default_resolve_path() -> String {
    "/resolve".to_string()
}

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Capacity of the controller event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 256 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl ControllerConfig {
    /// Validate the controller configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    256
}
