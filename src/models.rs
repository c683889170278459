//! Data models for the analyzer client.
//!
//! This module contains the wire types exchanged with the analyzer
//! service and the classified outcome of a single analysis cycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Message carried by every failure detected locally (transport or decoding).
pub const CONNECTION_ERROR_MESSAGE: &str = "Error de Conexión";

/// Detail prefix for replies that decoded but could not be classified.
pub const UNEXPECTED_REPLY_PREFIX: &str = "unexpected analyzer reply";

/// A lexical unit reported by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Source line of the token (1-indexed).
    pub line: u32,
    /// Token category, e.g. `KEYWORD`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Literal text of the token.
    pub value: String,
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub code: String,
}

impl AnalysisRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Raw reply from the analyzer service.
///
/// Only `isValid` is required. Every other field may be missing or `null`,
/// since the service fills different fields depending on its mode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub is_valid: bool,
    pub message: Option<String>,
    pub error_detail: Option<String>,
    pub error_type: Option<String>,
    pub tokens: Option<Vec<Token>>,
    pub original_size: Option<u64>,
    pub optimized_size: Option<u64>,
    pub reduction_percentage: Option<f64>,
    pub optimized_code: Option<String>,
    pub server_memory_usage: Option<String>,
}

/// Failure category of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorKind {
    /// Invalid characters or malformed literals
    Lexical,
    /// The code does not parse
    Syntactic,
    /// The code parses but is not meaningful (types, assignability)
    Semantic,
    /// Transport or decoding failure, detected by the client itself
    Connection,
}

impl ErrorKind {
    /// Kinds the analyzer itself may report, in panel order.
    pub const CODE_KINDS: [ErrorKind; 3] =
        [ErrorKind::Lexical, ErrorKind::Syntactic, ErrorKind::Semantic];

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Lexical => "LEXICAL",
            ErrorKind::Syntactic => "SYNTACTIC",
            ErrorKind::Semantic => "SEMANTIC",
            ErrorKind::Connection => "CONNECTION",
        }
    }

    /// Human-readable panel title.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorKind::Lexical => "Lexical error",
            ErrorKind::Syntactic => "Syntax error",
            ErrorKind::Semantic => "Semantic error",
            ErrorKind::Connection => "Connection error",
        }
    }

    /// Whether the kind describes the code rather than the transport.
    pub fn is_code_error(&self) -> bool {
        !matches!(self, ErrorKind::Connection)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses an `errorType` reported by the analyzer.
///
/// `CONNECTION` is never accepted from the wire: it is a local classification.
impl FromStr for ErrorKind {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LEXICAL" => Ok(ErrorKind::Lexical),
            "SYNTACTIC" => Ok(ErrorKind::Syntactic),
            "SEMANTIC" => Ok(ErrorKind::Semantic),
            other => Err(ClassifyError::UnknownErrorType(other.to_string())),
        }
    }
}

/// A well-formed reply that still cannot be classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("analyzer reported a failure without an errorType")]
    MissingErrorType,

    #[error("analyzer reported an unrecognized errorType: {0:?}")]
    UnknownErrorType(String),
}

/// Size metrics reported by the optimizing analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationMetrics {
    pub original_size: u64,
    pub optimized_size: u64,
    pub reduction_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_code: Option<String>,
}

impl OptimizationMetrics {
    /// Extracts metrics from a reply; both sizes must be present.
    pub fn from_response(response: &AnalysisResponse) -> Option<Self> {
        let original_size = response.original_size?;
        let optimized_size = response.optimized_size?;
        let reduction_percentage = response
            .reduction_percentage
            .unwrap_or_else(|| reduction_percentage(original_size, optimized_size));

        Some(Self {
            original_size,
            optimized_size,
            reduction_percentage,
            optimized_code: response.optimized_code.clone(),
        })
    }

    /// Bytes removed by the optimizer (negative if the code grew).
    pub fn bytes_saved(&self) -> i64 {
        self.original_size as i64 - self.optimized_size as i64
    }
}

fn reduction_percentage(original: u64, optimized: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - optimized as f64) / original as f64 * 100.0
}

/// Terminal result of one analysis cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum AnalysisOutcome {
    Success {
        message: String,
        /// `None` when the service sent no token list at all.
        tokens: Option<Vec<Token>>,
        optimization: Option<OptimizationMetrics>,
        server_memory_usage: Option<String>,
    },
    Failure {
        message: String,
        error_detail: String,
        kind: ErrorKind,
    },
}

impl AnalysisOutcome {
    /// Failure for a transport or decoding problem.
    pub fn connection_failure(detail: impl Into<String>) -> Self {
        AnalysisOutcome::Failure {
            message: CONNECTION_ERROR_MESSAGE.to_string(),
            error_detail: detail.into(),
            kind: ErrorKind::Connection,
        }
    }

    /// Classifies a decoded reply, trusting `isValid` and `errorType` verbatim.
    pub fn from_response(response: AnalysisResponse) -> Result<Self, ClassifyError> {
        if response.is_valid {
            let optimization = OptimizationMetrics::from_response(&response);
            return Ok(AnalysisOutcome::Success {
                message: response.message.unwrap_or_default(),
                tokens: response.tokens,
                optimization,
                server_memory_usage: response.server_memory_usage,
            });
        }

        let kind = match response.error_type.as_deref() {
            None | Some("") => return Err(ClassifyError::MissingErrorType),
            Some(raw) => raw.parse::<ErrorKind>()?,
        };

        Ok(AnalysisOutcome::Failure {
            message: response.message.unwrap_or_default(),
            error_detail: response.error_detail.unwrap_or_default(),
            kind,
        })
    }

    /// Classifies the result of a request, successful or not.
    ///
    /// Transport errors and unclassifiable replies both become `CONNECTION`
    /// failures; the client never guesses a code-level kind on its own.
    pub fn from_reply<E: fmt::Display>(reply: Result<AnalysisResponse, E>) -> Self {
        match reply {
            Ok(response) => Self::from_response(response).unwrap_or_else(|e| {
                Self::connection_failure(format!("{}: {}", UNEXPECTED_REPLY_PREFIX, e))
            }),
            Err(e) => Self::connection_failure(e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            AnalysisOutcome::Success { message, .. } | AnalysisOutcome::Failure { message, .. } => {
                message
            }
        }
    }

    /// Failure kind, if any.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AnalysisOutcome::Success { .. } => None,
            AnalysisOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Reported tokens; empty for failures and token-less replies.
    pub fn tokens(&self) -> &[Token] {
        match self {
            AnalysisOutcome::Success {
                tokens: Some(tokens),
                ..
            } => tokens,
            _ => &[],
        }
    }
}
