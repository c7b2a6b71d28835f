//! View state owned by the controller and read by renderers

use chrono::{DateTime, Utc};

use crate::model::Dataset;

/// Controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// A dataset load is outstanding
    Loading,
    /// The latest load succeeded
    Ready,
    /// The latest load or submission failed
    Error,
    /// A resolution request is outstanding
    Submitting,
}

impl Phase {
    /// Lowercase name for logs and renderers
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Ready => "ready",
            Phase::Error => "error",
            Phase::Submitting => "submitting",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of everything a renderer needs
///
/// Only [`ViewController`](crate::ViewController) writes this value.
/// Renderers get clones or a `watch` subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Last applied dataset
    pub dataset: Option<Dataset>,

    /// Current phase
    pub phase: Phase,

    /// User-facing error text
    pub error_message: Option<String>,

    /// Text currently in the domain input
    pub domain_input: String,

    /// Domain of the outstanding submission
    ///
    /// Set when a submission starts and cleared once it fails or its
    /// reload completes, so it also covers the reload's `Loading` phase.
    pub pending_domain: Option<String>,

    /// When `dataset` was applied
    pub last_loaded_at: Option<DateTime<Utc>>,
}

impl ViewState {
    /// State at mount time, before the initial load completes
    pub fn mounting() -> Self {
        Self {
            dataset: None,
            phase: Phase::Loading,
            error_message: None,
            domain_input: String::new(),
            pending_domain: None,
            last_loaded_at: None,
        }
    }

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        self.pending_domain.is_none() && !self.domain_input.trim().is_empty()
    }

    /// Check the phase invariants
    ///
    /// The error phase never shows a dataset and always carries a message.
    pub fn is_consistent(&self) -> bool {
        match self.phase {
            Phase::Error => self.dataset.is_none() && self.error_message.is_some(),
            Phase::Ready => self.dataset.is_some() && self.error_message.is_none(),
            Phase::Submitting => self.error_message.is_none() && self.pending_domain.is_some(),
            Phase::Loading => self.error_message.is_none(),
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::mounting()
    }
}
