//! Analysis workflow: the request lifecycle state machine and its driver.
//!
//! `Idle -> Pending -> Resolved -> Pending ...`, with only the latest
//! request ever allowed to resolve.

pub mod engine;
pub mod machine;

pub use engine::AnalysisEngine;
pub use machine::WorkflowState;
