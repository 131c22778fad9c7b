//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Every failure a handler can raise is one of these variants. The error
/// middleware classifies by variant, never by message content:
/// - [`ServiceError::Application`] → caller-supplied status
/// - [`ServiceError::Example`] → 400
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::Internal`] → 500
///
/// New failure categories get a new variant with a fixed status.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Generic application error with an explicit status code.
    #[error("{message}")]
    Application {
        status: u16,
        message: String,
        operation: String,
    },

    /// The example domain operation could not produce a result.
    #[error("{message}")]
    Example { message: String, operation: String },

    /// No route or resource matched the request.
    #[error("{message}")]
    NotFound { message: String, operation: String },

    /// An unexpected failure from any collaborator.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// Construct a generic application error.
    ///
    /// A `status` outside the HTTP range `100..=599` is replaced with 500.
    pub fn application(
        status: u16,
        message: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        let status = if (100..=599).contains(&status) {
            status
        } else {
            500
        };
        ServiceError::Application {
            status,
            message: message.into(),
            operation: operation.into(),
        }
    }

    /// Construct an [`ServiceError::Example`] error (always 400).
    pub fn example(message: impl Into<String>, operation: impl Into<String>) -> Self {
        ServiceError::Example {
            message: message.into(),
            operation: operation.into(),
        }
    }

    /// Construct a [`ServiceError::NotFound`] error (always 404).
    pub fn not_found(message: impl Into<String>, operation: impl Into<String>) -> Self {
        ServiceError::NotFound {
            message: message.into(),
            operation: operation.into(),
        }
    }

    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::Application { status, .. } => *status,
            ServiceError::Example { .. } => 400,
            ServiceError::NotFound { .. } => 404,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Human-readable message, safe to expose to callers.
    ///
    /// For [`ServiceError::Internal`] this is the raw top-level message of the
    /// wrapped error, without its source chain.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Name of the logical operation that raised the error, if known.
    pub fn operation(&self) -> Option<&str> {
        match self {
            ServiceError::Application { operation, .. }
            | ServiceError::Example { operation, .. }
            | ServiceError::NotFound { operation, .. } => Some(operation),
            ServiceError::Internal(_) => None,
        }
    }

    /// Whether this is an uncaught failure rather than a domain error.
    pub fn is_internal(&self) -> bool {
        matches!(self, ServiceError::Internal(_))
    }
}
