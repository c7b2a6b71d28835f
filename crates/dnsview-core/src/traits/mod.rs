//! Core traits for the records viewer
//!
//! - [`RecordsGateway`]: Load the dataset and submit domains to the records service

pub mod records_gateway;

pub use records_gateway::RecordsGateway;
