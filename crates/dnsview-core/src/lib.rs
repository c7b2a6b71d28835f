// # dnsview-core
//
// Core library for the DNS records viewer.
//
// ## Architecture Overview
//
// This library provides the client-side synchronization logic:
// - **Dataset**: Typed name server → IP → record kind → values model
// - **RecordsGateway**: Trait for loading the dataset and submitting domains
// - **ViewController**: State machine that owns the view state and sequences
//   load → submit → reload
//
// Rendering is left to consumers. They subscribe to the controller's
// `ViewState` and never write to it.
//
// ## Design Principles
//
// 1. **Single Writer**: Only the controller mutates view state
// 2. **Closed Error Taxonomy**: Gateways return Network, Http, Parse or Submission failures
// 3. **Latest Load Wins**: Superseded load completions are discarded
// 4. **Library-First**: The binary is a thin front end over this crate

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod traits;

// Re-export core types for convenience
pub use config::{ClientConfig, ControllerConfig, EndpointConfig};
pub use controller::{
    ControllerEvent, IgnoreReason, Phase, SubmitDisposition, ViewController, ViewState,
};
pub use error::{Error, Result};
pub use model::{Dataset, HostRecordSet, RecordGroup, RecordKind, SubmissionOutcome, SubmissionRequest};
pub use traits::RecordsGateway;
