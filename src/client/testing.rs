//! Scripted in-memory transport for tests.

use super::transport::{AnalyzerTransport, TransportError};
use crate::models::{AnalysisRequest, AnalysisResponse, Token};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

type Reply = Result<AnalysisResponse, TransportError>;

#[derive(Default)]
struct Script {
    replies: VecDeque<oneshot::Receiver<Reply>>,
    requests: Vec<AnalysisRequest>,
}

/// Transport whose replies are released by the test, one request at a time.
///
/// Each call to `analyze` consumes the next slot queued with `push`; the
/// request stays pending until the matching sender fires.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    /// Queue a reply slot for the next request.
    pub fn push(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().unwrap().replies.push_back(rx);
        tx
    }

    /// Requests issued so far, in order.
    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.script.lock().unwrap().requests.clone()
    }
}

impl AnalyzerTransport for ScriptedTransport {
    fn analyze(&self, request: AnalysisRequest) -> BoxFuture<'static, Reply> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(request);
        let slot = script.replies.pop_front();

        async move {
            match slot {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(TransportError::Request("reply dropped".to_string()))),
                None => Err(TransportError::Request("no scripted reply".to_string())),
            }
        }
        .boxed()
    }
}

/// A valid reply carrying the given message and tokens.
pub fn success(message: &str, tokens: &[(u32, &str, &str)]) -> AnalysisResponse {
    AnalysisResponse {
        is_valid: true,
        message: Some(message.to_string()),
        tokens: Some(
            tokens
                .iter()
                .map(|(line, kind, value)| Token {
                    line: *line,
                    kind: kind.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        ),
        ..Default::default()
    }
}

/// An invalid reply of the given `errorType`.
pub fn failure(message: &str, detail: &str, error_type: &str) -> AnalysisResponse {
    AnalysisResponse {
        is_valid: false,
        message: Some(message.to_string()),
        error_detail: Some(detail.to_string()),
        error_type: Some(error_type.to_string()),
        ..Default::default()
    }
}
