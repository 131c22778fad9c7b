//! Response bodies returned by the public HTTP API.
//!
//! Every route except the health probe answers with an [`Envelope`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Status codes below this value are reported as [`Outcome::Success`].
pub const FIRST_ERROR_STATUS: u16 = 400;

/// Coarse outcome of a request, derived from its HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
}

impl Outcome {
    /// `Success` iff `status < 400`.
    pub fn for_status(status: u16) -> Self {
        if status < FIRST_ERROR_STATUS {
            Outcome::Success
        } else {
            Outcome::Error
        }
    }
}

/// The canonical `{status, message, data}` body.
///
/// `status` is not settable on its own: it is always computed from the HTTP
/// status code passed to [`Envelope::new`]. A missing payload is serialised
/// as `"data": null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    status: Outcome,
    message: String,
    data: Option<T>,
}

impl<T> Envelope<T> {
    /// Build the envelope for a response sent with `status_code`.
    pub fn new(status_code: u16, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            status: Outcome::for_status(status_code),
            message: message.into(),
            data,
        }
    }

    pub fn status(&self) -> Outcome {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /`. Deliberately not wrapped in an [`Envelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

impl HealthResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
