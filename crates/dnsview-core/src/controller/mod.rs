//! View state controller
//!
//! The ViewController is responsible for:
//! - Issuing the initial dataset load at mount
//! - Storing load results or user-facing errors
//! - Submitting domains and reloading after a successful submission
//! - Refusing overlapping submissions
//! - Discarding load completions that a newer load or submission superseded
//!
//! ## Phases
//!
//! ```text
//!            mount / refresh
//!                  │
//!                  ▼
//!            ┌───────────┐   ok    ┌─────────┐
//!     ┌────▶ │  Loading  │ ──────▶ │  Ready  │ ──┐
//!     │      └───────────┘         └─────────┘   │
//!     │            │ err                         │ submit
//!     │            ▼                             │ (non-blank domain)
//!     │      ┌───────────┐                       │
//!     │      │   Error   │ ◀─────────┐           │
//!     │      └───────────┘  failure  │           │
//!     │            │ submit          │           ▼
//!     │            └──────────▶ ┌────────────┐ ◀─┘
//!     └──────────────────────── │ Submitting │
//!              success          └────────────┘
//! ```
//!
//! ## Ordering
//!
//! Every load takes a ticket from a monotonically increasing generation
//! counter and is applied only if its ticket is still the latest when it
//! completes. Starting a submission also advances the generation, so a load
//! that was in flight before the submission can never overwrite the
//! post-submission reload.
//!
//! All state changes go through the `watch` sender, so each check-and-set
//! runs under one lock and no lock is held across a gateway call.

pub mod state;

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, trace, warn};

use crate::config::ControllerConfig;
use crate::error::Result;
use crate::model::{Dataset, SubmissionRequest};
use crate::traits::RecordsGateway;

pub use state::{Phase, ViewState};

/// Why a submit invocation did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A submission is already outstanding
    AlreadySubmitting,
    /// The domain input is empty or whitespace only
    EmptyDomain,
}

/// Result of a submit invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDisposition {
    /// No request was sent and the state is unchanged
    Ignored(IgnoreReason),
    /// The service resolved the domain and the dataset was reloaded
    Resolved,
    /// The submission failed; the view is in the error phase
    Failed {
        /// Message placed in the view state
        message: String,
    },
}

/// Events emitted by the ViewController
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Phase transition
    PhaseChanged { from: Phase, to: Phase },

    /// Dataset load sent to the gateway
    LoadIssued { generation: u64 },

    /// Load completion written to the view state
    LoadApplied { generation: u64, succeeded: bool },

    /// Load completion dropped because a newer load or submission superseded it
    LoadDiscarded { generation: u64 },

    /// Resolution request sent to the gateway
    SubmissionStarted { domain: String },

    /// The service resolved the domain
    SubmissionSucceeded { domain: String },

    /// The submission failed
    SubmissionFailed { domain: String, message: String },

    /// Submit invocation that changed nothing
    SubmitIgnored { reason: IgnoreReason },
}

/// Records view state machine
///
/// Owns the [`ViewState`] and is its only writer. Methods take `&self`, so
/// a controller shared through an `Arc` can run a submission while the user
/// keeps editing the domain input.
///
/// ## Lifecycle
///
/// 1. Create with [`ViewController::new()`] (phase is `Loading`)
/// 2. Call [`ViewController::mount()`] to issue the initial load
/// 3. Drive with [`set_domain_input`](ViewController::set_domain_input),
///    [`submit`](ViewController::submit) and [`refresh`](ViewController::refresh)
/// 4. Drop to unmount
pub struct ViewController {
    /// Gateway to the records service
    gateway: Box<dyn RecordsGateway>,

    /// Current view state; receivers are read-only
    state: watch::Sender<ViewState>,

    /// Ticket of the latest load or submission
    generation: AtomicU64,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<ControllerEvent>,
}

impl ViewController {
    /// Create a new controller
    ///
    /// # Returns
    ///
    /// A tuple of (controller, event_receiver) where event_receiver yields controller events
    pub fn new(
        gateway: Box<dyn RecordsGateway>,
        config: &ControllerConfig,
    ) -> Result<(Self, mpsc::Receiver<ControllerEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);
        let (state, _) = watch::channel(ViewState::mounting());

        let controller = Self {
            gateway,
            state,
            generation: AtomicU64::new(0),
            event_tx: tx,
        };

        Ok((controller, rx))
    }

    /// Issue the initial dataset load
    pub async fn mount(&self) {
        debug!("Mounting view using gateway {}", self.gateway.gateway_name());
        self.refresh().await;
    }

    /// Reload the dataset
    ///
    /// Ignored while a submission or its reload is outstanding, since that
    /// reload already fetches the latest dataset.
    ///
    /// # Returns
    ///
    /// `true` if a load was issued
    pub async fn refresh(&self) -> bool {
        match self.begin_load(false) {
            Some(generation) => {
                self.run_load(generation, false).await;
                true
            }
            None => {
                debug!("Refresh ignored while submitting");
                false
            }
        }
    }

    /// Replace the domain input text
    ///
    /// Allowed in every phase.
    pub fn set_domain_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_if_modified(|view| {
            if view.domain_input == text {
                return false;
            }
            view.domain_input = text;
            true
        });
    }

    /// Submit the current domain input
    ///
    /// Does nothing when the trimmed input is empty or a submission is
    /// already outstanding, including its reload. Otherwise enters
    /// `Submitting`, sends the request, and on success reloads the dataset
    /// exactly once, so the observed phases are
    /// `Submitting → Loading → Ready | Error`. On failure the view moves to
    /// `Error` and any held dataset is cleared.
    pub async fn submit(&self) -> SubmitDisposition {
        self.run_submit(None).await
    }

    /// Replace the domain input and submit that text
    ///
    /// The input change and the start of the submission happen in one state
    /// update, so concurrent callers each send their own text or are
    /// ignored. The input is updated even when the submission is ignored.
    pub async fn submit_domain(&self, text: impl Into<String>) -> SubmitDisposition {
        self.run_submit(Some(text.into())).await
    }

    async fn run_submit(&self, text: Option<String>) -> SubmitDisposition {
        let (request, from) = match self.begin_submit(text) {
            Ok(started) => started,
            Err(reason) => {
                debug!("Submit ignored: {:?}", reason);
                self.emit_event(ControllerEvent::SubmitIgnored { reason });
                return SubmitDisposition::Ignored(reason);
            }
        };

        let domain = request.domain().to_string();
        self.emit_event(ControllerEvent::PhaseChanged {
            from,
            to: Phase::Submitting,
        });
        self.emit_event(ControllerEvent::SubmissionStarted {
            domain: domain.clone(),
        });
        info!(
            "Submitting domain {} via {}",
            domain,
            self.gateway.gateway_name()
        );

        match self.gateway.submit_domain(&request).await {
            Ok(()) => {
                info!("Domain {} resolved, reloading dataset", domain);
                self.emit_event(ControllerEvent::SubmissionSucceeded { domain });

                if let Some(generation) = self.begin_load(true) {
                    self.run_load(generation, true).await;
                }
                SubmitDisposition::Resolved
            }
            Err(e) => {
                let message = e.user_message();
                warn!("Failed to resolve domain {}: {}", domain, e);
                self.fail_submission(&message);
                self.emit_event(ControllerEvent::SubmissionFailed {
                    domain,
                    message: message.clone(),
                });
                SubmitDisposition::Failed { message }
            }
        }
    }

    /// Subscribe to state changes (read-only)
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Stream of states, starting with the current one
    pub fn watch(&self) -> WatchStream<ViewState> {
        WatchStream::new(self.state.subscribe())
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        self.state.borrow().can_submit()
    }

    /// Enter `Loading` and take a new load ticket
    ///
    /// Only the post-submission reload may start while a submission is
    /// outstanding.
    fn begin_load(&self, after_submission: bool) -> Option<u64> {
        let mut issued = None;
        let mut from = None;

        self.state.send_if_modified(|view| {
            if view.pending_domain.is_some() && !after_submission {
                return false;
            }

            issued = Some(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
            if view.phase != Phase::Loading {
                from = Some(view.phase);
                view.phase = Phase::Loading;
            }
            let cleared_error = view.error_message.take().is_some();
            from.is_some() || cleared_error
        });

        if let Some(from) = from {
            debug!("Phase {} -> loading", from);
            self.emit_event(ControllerEvent::PhaseChanged {
                from,
                to: Phase::Loading,
            });
        }
        issued
    }

    /// Call the gateway and apply the result if the ticket is still current
    async fn run_load(&self, generation: u64, completes_submission: bool) {
        debug!("Issuing load {}", generation);
        self.emit_event(ControllerEvent::LoadIssued { generation });

        let result = self.gateway.load_dataset().await;
        self.finish_load(generation, result, completes_submission);
    }

    /// Apply a load result
    ///
    /// A post-submission reload releases the pending submission in the same
    /// state update, whether or not its result is applied.
    fn finish_load(&self, generation: u64, result: Result<Dataset>, completes_submission: bool) {
        let succeeded = result.is_ok();
        let mut from = Phase::Loading;
        let mut to = Phase::Loading;
        let mut applied = false;
        let mut failure = None;

        self.state.send_if_modified(|view| {
            let released = completes_submission && view.pending_domain.take().is_some();
            if self.generation.load(Ordering::SeqCst) != generation {
                return released;
            }

            from = view.phase;
            match result {
                Ok(dataset) => {
                    view.dataset = Some(dataset);
                    view.error_message = None;
                    view.phase = Phase::Ready;
                    view.last_loaded_at = Some(Utc::now());
                }
                Err(e) => {
                    view.dataset = None;
                    view.error_message = Some(e.user_message());
                    view.phase = Phase::Error;
                    failure = Some(e);
                }
            }
            to = view.phase;
            applied = true;
            true
        });

        if !applied {
            debug!("Discarding superseded load {}", generation);
            self.emit_event(ControllerEvent::LoadDiscarded { generation });
            return;
        }

        match failure {
            Some(e) => warn!("Load {} failed: {}", generation, e),
            None => info!("Load {} applied", generation),
        }
        self.emit_event(ControllerEvent::LoadApplied {
            generation,
            succeeded,
        });
        if from != to {
            debug!("Phase {} -> {}", from, to);
            self.emit_event(ControllerEvent::PhaseChanged { from, to });
        }
    }

    /// Enter `Submitting` if the input allows it
    ///
    /// `text`, when given, replaces the domain input first. Advances the
    /// generation so any in-flight load is superseded.
    fn begin_submit(
        &self,
        text: Option<String>,
    ) -> std::result::Result<(SubmissionRequest, Phase), IgnoreReason> {
        let mut outcome = Err(IgnoreReason::EmptyDomain);

        self.state.send_if_modified(|view| {
            let input_changed = match text {
                Some(text) if text != view.domain_input => {
                    view.domain_input = text;
                    true
                }
                _ => false,
            };

            if view.pending_domain.is_some() {
                outcome = Err(IgnoreReason::AlreadySubmitting);
                return input_changed;
            }

            let Ok(request) = SubmissionRequest::new(&view.domain_input) else {
                return input_changed;
            };

            let superseded = self.generation.fetch_add(1, Ordering::SeqCst);
            if view.phase == Phase::Loading {
                debug!("Submission supersedes in-flight load {}", superseded);
            }

            view.pending_domain = Some(request.domain().to_string());
            outcome = Ok((request, view.phase));
            view.phase = Phase::Submitting;
            view.error_message = None;
            true
        });

        outcome
    }

    fn fail_submission(&self, message: &str) {
        let mut from = Phase::Submitting;
        self.state.send_modify(|view| {
            from = view.phase;
            view.dataset = None;
            view.error_message = Some(message.to_string());
            view.phase = Phase::Error;
            view.pending_domain = None;
        });

        if from != Phase::Error {
            self.emit_event(ControllerEvent::PhaseChanged {
                from,
                to: Phase::Error,
            });
        }
    }

    /// Emit a controller event
    fn emit_event(&self, event: ControllerEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            Err(TrySendError::Closed(_)) => {
                trace!("Event receiver dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::model::{HostRecordSet, RecordGroup};
    use async_trait::async_trait;

    struct StaticGateway {
        load: Result<Dataset>,
        submit: Result<()>,
    }

    #[async_trait]
    impl RecordsGateway for StaticGateway {
        async fn load_dataset(&self) -> Result<Dataset> {
            self.load.clone()
        }

        async fn submit_domain(&self, _request: &SubmissionRequest) -> Result<()> {
            self.submit.clone()
        }

        fn gateway_name(&self) -> &'static str {
            "static"
        }
    }

    fn sample() -> Dataset {
        Dataset::new().with(
            "ns1.example.com",
            HostRecordSet::new().with(
                "1.2.3.4",
                RecordGroup::new().with("A", vec!["93.1.1.1".to_string()]),
            ),
        )
    }

    fn controller(load: Result<Dataset>, submit: Result<()>) -> ViewController {
        let (controller, _rx) = ViewController::new(
            Box::new(StaticGateway { load, submit }),
            &ControllerConfig::default(),
        )
        .unwrap();
        controller
    }

    #[test]
    fn test_new_starts_loading() {
        let controller = controller(Ok(sample()), Ok(()));
        assert_eq!(controller.phase(), Phase::Loading);
        assert_eq!(controller.snapshot(), ViewState::mounting());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = ViewController::new(
            Box::new(StaticGateway {
                load: Ok(Dataset::new()),
                submit: Ok(()),
            }),
            &ControllerConfig {
                event_channel_capacity: 0,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_mount_success_sets_ready() {
        let controller = controller(Ok(sample()), Ok(()));
        tokio_test::block_on(controller.mount());

        let state = controller.snapshot();
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.dataset, Some(sample()));
        assert!(state.last_loaded_at.is_some());
        assert!(state.is_consistent());
    }

    #[test]
    fn test_mount_failure_sets_error() {
        let controller = controller(Err(Error::http(500, "db down")), Ok(()));
        tokio_test::block_on(controller.mount());

        let state = controller.snapshot();
        assert_eq!(state.phase, Phase::Error);
        assert_eq!(state.error_message.as_deref(), Some("db down"));
        assert!(state.dataset.is_none());
    }

    #[test]
    fn test_domain_input_is_editable_while_loading() {
        let controller = controller(Ok(sample()), Ok(()));
        controller.set_domain_input("example.com");
        assert_eq!(controller.phase(), Phase::Loading);
        assert_eq!(controller.snapshot().domain_input, "example.com");
        assert!(controller.can_submit());
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let controller = controller(Ok(sample()), Ok(()));
        tokio_test::block_on(controller.mount());
        controller.set_domain_input("  ");

        let before = controller.snapshot();
        let disposition = tokio_test::block_on(controller.submit());

        assert_eq!(
            disposition,
            SubmitDisposition::Ignored(IgnoreReason::EmptyDomain)
        );
        assert_eq!(controller.snapshot(), before);
    }

    #[test]
    fn test_failed_submission_clears_dataset() {
        let controller = controller(Ok(sample()), Err(Error::submission("nope")));
        tokio_test::block_on(controller.mount());
        controller.set_domain_input("bad domain");

        let disposition = tokio_test::block_on(controller.submit());
        assert_eq!(
            disposition,
            SubmitDisposition::Failed {
                message: "nope".to_string()
            }
        );

        let state = controller.snapshot();
        assert_eq!(state.phase, Phase::Error);
        assert!(state.dataset.is_none());
        assert!(state.is_consistent());
    }
}
