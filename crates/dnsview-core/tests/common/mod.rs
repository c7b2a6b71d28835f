//! Test doubles and common utilities for controller contract tests
//!
//! The scripted gateway replays queued results in order and counts calls.
//! Gated steps block until the test releases them, which lets tests choose
//! the order in which overlapping requests complete.

#![allow(dead_code)]

use dnsview_core::error::{Error, Result};
use dnsview_core::{
    ControllerConfig, ControllerEvent, Dataset, HostRecordSet, Phase, RecordGroup,
    RecordsGateway, SubmissionRequest, ViewController,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

enum Step<T> {
    Immediate(Result<T>),
    Gated(oneshot::Receiver<Result<T>>),
}

impl<T> Step<T> {
    async fn resolve(self) -> Result<T> {
        match self {
            Step::Immediate(result) => result,
            Step::Gated(rx) => rx
                .await
                .unwrap_or_else(|_| Err(Error::network("gate dropped"))),
        }
    }
}

/// A RecordsGateway that replays scripted results
///
/// Clones share the same script and counters, so a test can keep one clone
/// after handing another to the controller.
#[derive(Clone)]
pub struct ScriptedGateway {
    loads: Arc<Mutex<VecDeque<Step<Dataset>>>>,
    submits: Arc<Mutex<VecDeque<Step<()>>>>,
    load_calls: Arc<AtomicUsize>,
    submit_calls: Arc<AtomicUsize>,
    submitted: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            loads: Arc::new(Mutex::new(VecDeque::new())),
            submits: Arc::new(Mutex::new(VecDeque::new())),
            load_calls: Arc::new(AtomicUsize::new(0)),
            submit_calls: Arc::new(AtomicUsize::new(0)),
            submitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a load that completes immediately
    pub fn push_load(&self, result: Result<Dataset>) -> &Self {
        self.loads.lock().unwrap().push_back(Step::Immediate(result));
        self
    }

    /// Queue a load that completes when the returned sender fires
    pub fn push_gated_load(&self) -> oneshot::Sender<Result<Dataset>> {
        let (tx, rx) = oneshot::channel();
        self.loads.lock().unwrap().push_back(Step::Gated(rx));
        tx
    }

    /// Queue a submission that completes immediately
    pub fn push_submit(&self, result: Result<()>) -> &Self {
        self.submits
            .lock()
            .unwrap()
            .push_back(Step::Immediate(result));
        self
    }

    /// Queue a submission that completes when the returned sender fires
    pub fn push_gated_submit(&self) -> oneshot::Sender<Result<()>> {
        let (tx, rx) = oneshot::channel();
        self.submits.lock().unwrap().push_back(Step::Gated(rx));
        tx
    }

    /// Number of times load_dataset() was called
    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    /// Number of times submit_domain() was called
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Domains passed to submit_domain(), in call order
    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordsGateway for ScriptedGateway {
    async fn load_dataset(&self) -> Result<Dataset> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.loads.lock().unwrap().pop_front();
        match step {
            Some(step) => step.resolve().await,
            None => Err(Error::network("load script exhausted")),
        }
    }

    async fn submit_domain(&self, request: &SubmissionRequest) -> Result<()> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted
            .lock()
            .unwrap()
            .push(request.domain().to_string());
        let step = self.submits.lock().unwrap().pop_front();
        match step {
            Some(step) => step.resolve().await,
            None => Err(Error::submission("submit script exhausted")),
        }
    }

    fn gateway_name(&self) -> &'static str {
        "scripted"
    }
}

/// Build a controller around a clone of the gateway
pub fn controller_with(
    gateway: &ScriptedGateway,
) -> (Arc<ViewController>, mpsc::Receiver<ControllerEvent>) {
    let (controller, events) =
        ViewController::new(Box::new(gateway.clone()), &ControllerConfig::default())
            .expect("controller construction succeeds");
    (Arc::new(controller), events)
}

/// The single-record dataset from the initial load scenario
pub fn sample_dataset() -> Dataset {
    Dataset::new().with(
        "ns1.example.com",
        HostRecordSet::new().with(
            "1.2.3.4",
            RecordGroup::new().with("A", vec!["93.1.1.1".to_string()]),
        ),
    )
}

/// A dataset as it might look after resolving example.com
pub fn updated_dataset() -> Dataset {
    sample_dataset().with(
        "a.iana-servers.net",
        HostRecordSet::new().with(
            "199.43.135.53",
            RecordGroup::new()
                .with("A", vec!["93.184.215.14".to_string()])
                .with("MX", vec!["0 .".to_string()]),
        ),
    )
}

/// Drain all events currently buffered
pub fn drain_events(rx: &mut mpsc::Receiver<ControllerEvent>) -> Vec<ControllerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Phase transitions in emission order
pub fn transitions(events: &[ControllerEvent]) -> Vec<(Phase, Phase)> {
    events
        .iter()
        .filter_map(|event| match event {
            ControllerEvent::PhaseChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

/// Poll a condition until it holds, failing the test after one second
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within 1s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
