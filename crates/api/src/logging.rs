//! The failure log consumed by the error middleware.
//!
//! The middleware records every failure before it responds. Recording is
//! fire-and-forget: [`FailureLog::error`] returns nothing, and the middleware
//! discards a panicking sink so the response is still sent.

use tracing::error;

/// Request context attached to a logged failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureContext {
    pub method: String,
    pub url: String,
    /// Status code of the response the failure produced.
    pub status: u16,
    /// Source chain of the error, outermost first. The "stack" of a failure.
    pub details: Vec<String>,
}

/// Sink for request failures.
pub trait FailureLog: Send + Sync {
    fn error(&self, message: &str, context: &FailureContext);
}

/// Prefix `message` with the operation that produced it: `[operation] message`.
pub fn log_message(operation: &str, message: &str) -> String {
    format!("[{operation}] {message}")
}

/// Writes failures as `tracing` events at `ERROR` level.
///
/// In production mode the error details are dropped; otherwise they are
/// emitted on one line, joined with `" > "`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog {
    production: bool,
}

impl TracingLog {
    pub fn new(production: bool) -> Self {
        Self { production }
    }

    fn render_details(&self, context: &FailureContext) -> Option<String> {
        if self.production || context.details.is_empty() {
            return None;
        }
        Some(context.details.join(" > "))
    }
}

impl FailureLog for TracingLog {
    fn error(&self, message: &str, context: &FailureContext) {
        match self.render_details(context) {
            Some(details) => error!(
                method = %context.method,
                url = %context.url,
                status = context.status,
                details = %details,
                "{message}"
            ),
            None => error!(
                method = %context.method,
                url = %context.url,
                status = context.status,
                "{message}"
            ),
        }
    }
}
