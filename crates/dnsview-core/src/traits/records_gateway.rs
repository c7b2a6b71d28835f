// # Records Gateway Trait
//
// Defines the interface the controller uses to talk to the records service.
//
// ## Implementations
//
// - HTTP: `dnsview-http` crate
// - Tests: scripted gateways in `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use dnsview_core::{RecordsGateway, SubmissionRequest};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let gateway = /* RecordsGateway implementation */;
//
//     let dataset = gateway.load_dataset().await?;
//     gateway.submit_domain(&SubmissionRequest::new("example.com")?).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::model::{Dataset, SubmissionRequest};

/// Trait for records service gateways
///
/// Implementations perform exactly one request per call and convert every
/// failure into the gateway taxonomy before returning:
///
/// | Operation | Failure kinds |
/// |-----------|---------------|
/// | [`load_dataset`](RecordsGateway::load_dataset) | `Network`, `Http`, `Parse` |
/// | [`submit_domain`](RecordsGateway::submit_domain) | `Submission` |
///
/// Gateways hold no view state. They never retry and never reload on their
/// own; sequencing belongs to [`ViewController`](crate::ViewController).
#[async_trait]
pub trait RecordsGateway: Send + Sync {
    /// Fetch the current dataset
    ///
    /// # Returns
    ///
    /// - `Ok(Dataset)`: The decoded dataset
    /// - `Err(Error::Network)`: The transport could not complete
    /// - `Err(Error::Http)`: The service returned a non-success status
    /// - `Err(Error::Parse)`: The success body did not decode
    async fn load_dataset(&self) -> Result<Dataset, crate::Error>;

    /// Ask the service to resolve a domain
    ///
    /// Succeeds only when the service reports `success`. The service's
    /// dataset may change as a result, so callers reload afterwards.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The service resolved the domain
    /// - `Err(Error::Submission)`: Any other outcome, with a user-facing message
    async fn submit_domain(&self, request: &SubmissionRequest) -> Result<(), crate::Error>;

    /// Get the gateway name (for logging/debugging)
    fn gateway_name(&self) -> &'static str;
}
