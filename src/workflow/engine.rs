//! Async driver for the analysis workflow.
//!
//! The engine runs effects produced by the state machine: each dispatch is
//! spawned as its own task whose reply is sent back over a channel and fed
//! through [`Workflow::update`]. Starting a new request (or clearing) aborts
//! the superseded task; replies that still slip through are discarded by
//! the generation check.

use super::machine::{Effect, Event, Generation, Workflow, WorkflowState};
use crate::client::{AnalyzerTransport, TransportError};
use crate::models::{AnalysisOutcome, AnalysisResponse};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

type Reply = (Generation, Result<AnalysisResponse, TransportError>);

/// Drives a [`Workflow`] against an [`AnalyzerTransport`].
///
/// Must be used from within a Tokio runtime.
pub struct AnalysisEngine<T> {
    workflow: Workflow,
    transport: T,
    replies_tx: mpsc::UnboundedSender<Reply>,
    replies_rx: mpsc::UnboundedReceiver<Reply>,
    in_flight: Option<JoinHandle<()>>,
}

impl<T: AnalyzerTransport> AnalysisEngine<T> {
    pub fn new(transport: T) -> Self {
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        Self {
            workflow: Workflow::new(),
            transport,
            replies_tx,
            replies_rx,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        self.workflow.state()
    }

    pub fn is_pending(&self) -> bool {
        self.workflow.state().is_pending()
    }

    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        self.workflow.state().outcome()
    }

    /// Start an analysis of `code`.
    ///
    /// The state is `Pending` when this returns, before any I/O happens.
    /// Returns `false` (and changes nothing) when `code` is blank.
    pub fn trigger(&mut self, code: &str) -> bool {
        let effect = self.workflow.update(Event::Trigger {
            code: code.to_string(),
        });
        match effect {
            Some(effect) => {
                self.execute(effect);
                true
            }
            None => false,
        }
    }

    /// Drop any outcome or pending request and return to `Idle`.
    pub fn clear(&mut self) {
        self.cancel_in_flight();
        self.workflow.update(Event::Clear);
    }

    /// Wait for one reply and apply it.
    ///
    /// Returns `true` if the reply resolved the current request, `false` if
    /// it was stale or nothing is pending. Cancel safe.
    pub async fn poll_reply(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }

        let Some((generation, result)) = self.replies_rx.recv().await else {
            return false;
        };
        self.workflow.update(Event::Reply { generation, result });
        self.outcome().is_some()
    }

    /// Wait until the current request resolves.
    ///
    /// Returns `None` immediately when nothing was triggered. A request that
    /// never completes keeps this pending.
    pub async fn resolve(&mut self) -> Option<&AnalysisOutcome> {
        while self.is_pending() {
            self.poll_reply().await;
        }
        self.outcome()
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::Dispatch {
                generation,
                request,
            } => {
                self.cancel_in_flight();

                let reply = self.transport.analyze(request);
                let replies_tx = self.replies_tx.clone();
                self.in_flight = Some(tokio::spawn(async move {
                    let result = reply.await;
                    // The receiver lives as long as the engine.
                    let _ = replies_tx.send((generation, result));
                }));
            }
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                debug!(
                    "Aborting in-flight request task (latest issued: {})",
                    self.workflow.last_issued()
                );
            }
            handle.abort();
        }
    }
}

impl<T> Drop for AnalysisEngine<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
