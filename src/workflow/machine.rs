//! Analysis workflow state machine.
//!
//! The machine is pure: it never touches the network. Every change goes
//! through [`Workflow::update`], which returns the side effect (if any) the
//! caller must perform. Replies are tagged with the [`Generation`] of the
//! request that produced them and are only applied while that exact
//! request is pending, so a late reply can never overwrite a newer state.

use crate::client::TransportError;
use crate::models::{AnalysisOutcome, AnalysisRequest, AnalysisResponse};
use std::fmt;
use tracing::{debug, info};

/// Sequence number of an issued request. Strictly increasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the most recent analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WorkflowState {
    #[default]
    Idle,
    Pending {
        generation: Generation,
    },
    Resolved {
        generation: Generation,
        outcome: AnalysisOutcome,
    },
}

impl WorkflowState {
    pub fn is_pending(&self) -> bool {
        matches!(self, WorkflowState::Pending { .. })
    }

    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        match self {
            WorkflowState::Resolved { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Pending { .. } => "pending",
            WorkflowState::Resolved { .. } => "resolved",
        }
    }
}

/// Input to the state machine.
#[derive(Debug)]
pub enum Event {
    /// The user asked for an analysis of `code`.
    Trigger { code: String },
    /// A request finished, successfully or not.
    Reply {
        generation: Generation,
        result: Result<AnalysisResponse, TransportError>,
    },
    /// The staged code changed; any outcome or pending request is void.
    Clear,
}

/// Side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send `request` to the analyzer and report back with `generation`.
    Dispatch {
        generation: Generation,
        request: AnalysisRequest,
    },
}

/// The workflow: current state plus the last generation handed out.
#[derive(Debug, Default)]
pub struct Workflow {
    state: WorkflowState,
    last_issued: Generation,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Generation of the most recently dispatched request.
    pub fn last_issued(&self) -> Generation {
        self.last_issued
    }

    /// Apply one event and return the effect to perform, if any.
    pub fn update(&mut self, event: Event) -> Option<Effect> {
        match event {
            Event::Trigger { code } => self.on_trigger(code),
            Event::Reply { generation, result } => {
                self.on_reply(generation, result);
                None
            }
            Event::Clear => {
                if self.state != WorkflowState::Idle {
                    debug!("Clearing {} analysis state", self.state.name());
                }
                self.state = WorkflowState::Idle;
                None
            }
        }
    }

    fn on_trigger(&mut self, code: String) -> Option<Effect> {
        if code.trim().is_empty() {
            debug!("Ignoring analysis trigger for blank code");
            return None;
        }

        let generation = self.last_issued.next();
        self.last_issued = generation;

        if let WorkflowState::Pending {
            generation: superseded,
        } = self.state
        {
            info!("Request {} superseded by {}", superseded, generation);
        }

        // Any previous outcome is dropped here, before the reply arrives.
        self.state = WorkflowState::Pending { generation };
        info!("Dispatching analysis request {}", generation);

        Some(Effect::Dispatch {
            generation,
            request: AnalysisRequest::new(code),
        })
    }

    fn on_reply(&mut self, generation: Generation, result: Result<AnalysisResponse, TransportError>) {
        let current = matches!(
            self.state,
            WorkflowState::Pending { generation: pending } if pending == generation
        );
        if !current {
            debug!(
                "Discarding stale reply for request {} (state: {})",
                generation,
                self.state.name()
            );
            return;
        }

        let outcome = AnalysisOutcome::from_reply(result);
        match outcome.kind() {
            None => info!(
                "Request {} resolved: valid, {} tokens",
                generation,
                outcome.tokens().len()
            ),
            Some(kind) => info!(
                "Request {} resolved: {} error ({})",
                generation,
                kind,
                outcome.message()
            ),
        }
        self.state = WorkflowState::Resolved {
            generation,
            outcome,
        };
    }
}
