//! Shared application state injected into every handler and middleware.

use std::sync::Arc;

use crate::logging::{FailureLog, TracingLog};
use crate::services::{ExampleService, StaticExample};

/// Service object shared across all request handlers.
///
/// Built once at startup. All fields are `Arc`-backed so that Axum can clone
/// the state for each request without copying anything expensive. Nothing in
/// here is mutated after construction.
#[derive(Clone)]
pub struct AppState {
    /// The example domain operation.
    pub example: Arc<dyn ExampleService>,
    /// Where the error middleware records failures.
    pub log: Arc<dyn FailureLog>,
}

impl AppState {
    /// Create a new [`AppState`] from its collaborators.
    pub fn new(example: Arc<dyn ExampleService>, log: Arc<dyn FailureLog>) -> Self {
        Self { example, log }
    }
}

impl Default for AppState {
    /// The static example service and a development-mode tracing log,
    /// suitable for tests.
    fn default() -> Self {
        Self::new(Arc::new(StaticExample), Arc::new(TracingLog::new(false)))
    }
}
