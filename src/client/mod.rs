//! Client side of the analyzer service.
//!
//! This module provides the transport seam used by the workflow engine
//! and its HTTP implementation.

pub mod transport;

#[cfg(test)]
pub mod testing;

pub use transport::{AnalyzerTransport, HttpTransport, TransportError};
