//! Input controller.
//!
//! A [`Session`] owns the staged source code and the analysis engine. Every
//! edit replaces the buffer wholesale and voids the current outcome, so a
//! result is never shown against code it was not computed for.

mod snippets;

pub use snippets::{example, DEFAULT_EXAMPLE, EXAMPLES};

use crate::client::AnalyzerTransport;
use crate::models::AnalysisOutcome;
use crate::workflow::{AnalysisEngine, WorkflowState};
use tracing::debug;

/// Code currently staged for analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBuffer(String);

impl SourceBuffer {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Replace the whole buffer.
    pub fn replace(&mut self, code: String) {
        self.0 = code;
    }

    /// Empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Source buffer plus the workflow that analyzes it.
pub struct Session<T> {
    buffer: SourceBuffer,
    engine: AnalysisEngine<T>,
}

impl<T: AnalyzerTransport> Session<T> {
    /// Create a session staged with the default example.
    pub fn new(transport: T) -> Self {
        let code = example(DEFAULT_EXAMPLE).map(|s| s.code).unwrap_or_default();
        Self {
            buffer: SourceBuffer::new(code),
            engine: AnalysisEngine::new(transport),
        }
    }

    pub fn code(&self) -> &str {
        self.buffer.as_str()
    }

    /// Replace the staged code and clear any outcome or pending request.
    pub fn set_code(&mut self, code: impl Into<String>) {
        self.buffer.replace(code.into());
        self.engine.clear();
    }

    /// Stage a built-in example. Returns `false` (a no-op) if the name is
    /// unknown or the example has no code.
    pub fn load_example(&mut self, name: &str) -> bool {
        match example(name) {
            Some(snippet) if !snippet.code.trim().is_empty() => {
                debug!("Loading example {}", snippet.name);
                self.set_code(snippet.code);
                true
            }
            _ => {
                debug!("No usable example named {:?}", name);
                false
            }
        }
    }

    /// Whether the analyze trigger is enabled.
    pub fn can_analyze(&self) -> bool {
        !self.buffer.is_blank()
    }

    /// Analyze the staged code. Inert (returns `false`) when it is blank.
    ///
    /// Re-triggering while a request is pending starts a new cycle; only the
    /// latest one will resolve.
    pub fn analyze(&mut self) -> bool {
        if !self.can_analyze() {
            return false;
        }
        self.engine.trigger(self.buffer.as_str())
    }

    pub fn state(&self) -> &WorkflowState {
        self.engine.state()
    }

    pub fn is_pending(&self) -> bool {
        self.engine.is_pending()
    }

    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        self.engine.outcome()
    }

    /// See [`AnalysisEngine::poll_reply`].
    pub async fn poll_reply(&mut self) -> bool {
        self.engine.poll_reply().await
    }

    /// See [`AnalysisEngine::resolve`].
    pub async fn resolve(&mut self) -> Option<&AnalysisOutcome> {
        self.engine.resolve().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{failure, success, ScriptedTransport};
    use crate::models::{AnalysisRequest, ErrorKind, Token};

    #[test]
    fn test_source_buffer() {
        let mut buffer = SourceBuffer::default();
        assert!(buffer.is_blank());

        buffer.replace(" \n ".to_string());
        assert!(buffer.is_blank());

        buffer.replace("let a = 1;".to_string());
        assert!(!buffer.is_blank());
        assert_eq!(buffer.as_str(), "let a = 1;");
    }

    #[tokio::test]
    async fn test_starts_with_default_example() {
        let session = Session::new(ScriptedTransport::default());
        assert_eq!(session.code(), example(DEFAULT_EXAMPLE).unwrap().code);
        assert!(session.can_analyze());
        assert_eq!(session.state(), &WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_blank_code_disables_analysis() {
        let transport = ScriptedTransport::default();
        let mut session = Session::new(transport.clone());

        session.set_code("   ");
        assert!(!session.can_analyze());
        assert!(!session.analyze());
        assert_eq!(session.state(), &WorkflowState::Idle);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_valid_snippet_scenario() {
        let transport = ScriptedTransport::default();
        let reply = transport.push();
        let mut session = Session::new(transport.clone());

        session.set_code("const x = 1;");
        assert!(session.analyze());
        assert!(session.is_pending());

        reply
            .send(Ok(success("OK", &[(1, "KEYWORD", "const")])))
            .unwrap();
        let outcome = session.resolve().await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(
            outcome.tokens(),
            &[Token {
                line: 1,
                kind: "KEYWORD".to_string(),
                value: "const".to_string(),
            }]
        );
        assert_eq!(transport.requests(), vec![AnalysisRequest::new("const x = 1;")]);
    }

    #[tokio::test]
    async fn test_syntax_error_scenario() {
        let transport = ScriptedTransport::default();
        let reply = transport.push();
        let mut session = Session::new(transport);

        session.set_code("const x = 1");
        session.analyze();
        reply
            .send(Ok(failure(
                "Syntax error",
                "Unexpected end of input",
                "SYNTACTIC",
            )))
            .unwrap();

        match session.resolve().await.unwrap() {
            AnalysisOutcome::Failure {
                error_detail, kind, ..
            } => {
                assert_eq!(*kind, ErrorKind::Syntactic);
                assert_eq!(error_detail, "Unexpected end of input");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_editing_clears_outcome() {
        let transport = ScriptedTransport::default();
        let reply = transport.push();
        let mut session = Session::new(transport);

        session.analyze();
        reply.send(Ok(success("OK", &[]))).unwrap();
        assert!(session.resolve().await.is_some());

        session.set_code("const y = 2;");
        assert!(session.outcome().is_none());
        assert_eq!(session.state(), &WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_editing_while_pending_voids_request() {
        let transport = ScriptedTransport::default();
        let reply = transport.push();
        let mut session = Session::new(transport);

        session.analyze();
        session.set_code("const y = 2;");
        let _ = reply.send(Ok(success("OK", &[])));

        assert!(session.resolve().await.is_none());
    }

    #[tokio::test]
    async fn test_load_example_then_analyze_uses_fresh_snippet() {
        let transport = ScriptedTransport::default();
        let _reply = transport.push();
        let mut session = Session::new(transport.clone());

        session.set_code("const stale = true;");
        assert!(session.load_example("syntax-error"));
        assert!(session.analyze());

        let snippet = example("syntax-error").unwrap();
        assert_eq!(transport.requests(), vec![AnalysisRequest::new(snippet.code)]);
    }

    #[tokio::test]
    async fn test_unknown_example_is_a_no_op() {
        let mut session = Session::new(ScriptedTransport::default());
        session.set_code("const keep = 1;");

        assert!(!session.load_example("does-not-exist"));
        assert_eq!(session.code(), "const keep = 1;");
    }
}
