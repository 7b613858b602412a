//! Per-invocation context
//!
//! Carries the trigger's request id and the tracing span every log line of
//! one refresh is emitted under. Passed explicitly to the pipeline and to
//! providers; nothing in the crate configures a process-wide logger.

use chrono::Utc;
use rand::Rng;
use tracing::Span;

#[derive(Debug, Clone)]
pub struct InvocationContext {
    request_id: String,
    span: Span,
}

impl InvocationContext {
    /// Create a context for a trigger event with a known id
    pub fn new(request_id: impl Into<String>) -> Self {
        let request_id = request_id.into();
        let span = tracing::info_span!("pool_refresh", request_id = %request_id);
        Self { request_id, span }
    }

    /// Create a context with a generated id, for manual runs
    pub fn generated() -> Self {
        Self::new(generate_request_id())
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// `{unix millis}-{16 hex chars}`
pub fn generate_request_id() -> String {
    let suffix: u64 = rand::thread_rng().gen();
    format!("{}-{:016x}", Utc::now().timestamp_millis(), suffix)
}
