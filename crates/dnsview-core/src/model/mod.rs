//! Data model for the records viewer
//!
//! - [`Dataset`]: name server → IP address → record kind → values
//! - [`SubmissionRequest`] / [`SubmissionOutcome`]: the resolve exchange

pub mod dataset;
pub mod submission;

pub use dataset::{Dataset, HostRecordSet, RecordGroup, RecordKind};
pub use submission::{SubmissionOutcome, SubmissionRequest};
