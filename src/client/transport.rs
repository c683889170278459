//! HTTP transport for the analyzer service.
//!
//! A transport turns one `AnalysisRequest` into one future resolving to the
//! decoded reply. The returned future is `'static` so the engine can await it
//! on a spawned task and abort it when a newer request supersedes it.

use crate::models::{AnalysisRequest, AnalysisResponse};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Path of the analysis endpoint, relative to the service base URL.
pub const ANALYZE_PATH: &str = "/analyze";

/// Failure to obtain a decoded reply from the analyzer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Cannot connect to analyzer at {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Analyzer returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to send request: {0}")]
    Request(String),

    #[error("Failed to decode analyzer response: {0}")]
    Decode(String),
}

/// Something that can submit a snippet to the analyzer.
pub trait AnalyzerTransport: Send + Sync + 'static {
    fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> BoxFuture<'static, Result<AnalysisResponse, TransportError>>;
}

/// `reqwest`-backed transport posting JSON to `{endpoint}/analyze`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// Create a transport for the given service base URL.
    ///
    /// `timeout` is `None` unless configured; without it a hung request
    /// keeps the workflow pending.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Request(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: analyze_url(endpoint),
        })
    }

    /// Full URL requests are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AnalyzerTransport for HttpTransport {
    fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> BoxFuture<'static, Result<AnalysisResponse, TransportError>> {
        post_analyze(self.client.clone(), self.url.clone(), request).boxed()
    }
}

/// Join the base URL and the analysis path.
pub fn analyze_url(endpoint: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), ANALYZE_PATH)
}

async fn post_analyze(
    client: reqwest::Client,
    url: String,
    request: AnalysisRequest,
) -> Result<AnalysisResponse, TransportError> {
    debug!("POST {} ({} bytes of code)", url, request.code.len());

    let response = client
        .post(&url)
        .json(&request)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout { url: url.clone() }
            } else if e.is_connect() {
                TransportError::Connect {
                    url: url.clone(),
                    message: e.to_string(),
                }
            } else {
                TransportError::Request(e.to_string())
            }
        })?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            status,
            body: body.trim().to_string(),
        });
    }

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            TransportError::Timeout { url: url.clone() }
        } else {
            TransportError::Request(e.to_string())
        }
    })?;

    serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
}
