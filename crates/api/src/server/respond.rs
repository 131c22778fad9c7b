//! The response formatter: the only code path that writes an enveloped body.
//!
//! Success and error responses share the `{status, message, data}` shape of
//! [`Envelope`]. Bodies are pretty-printed with a two-space indent.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use common::Envelope;
use serde::Serialize;
use tracing::error;

/// Marks a response whose body has been fully written by [`format`].
///
/// The error middleware never writes a second body over a committed response.
#[derive(Debug, Clone, Copy)]
pub struct Committed;

/// Serialise `{status, message, data}` and finalise the response with `status`.
///
/// Deterministic: the same inputs always produce byte-identical bodies. If the
/// payload cannot be serialised, a 500 error envelope is sent instead.
pub fn format<T: Serialize>(status: StatusCode, data: Option<T>, message: &str) -> Response {
    let envelope = Envelope::new(status.as_u16(), data, message);
    match serde_json::to_vec_pretty(&envelope) {
        Ok(body) => finish(status, body),
        Err(e) => {
            error!(error = %e, %status, "failed to serialise response payload");
            let fallback: Envelope<()> = Envelope::new(
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                None,
                "Failed to serialise response",
            );
            // An envelope without a payload only holds strings.
            let body = serde_json::to_vec_pretty(&fallback).unwrap_or_default();
            finish(StatusCode::INTERNAL_SERVER_ERROR, body)
        }
    }
}

fn finish(status: StatusCode, body: Vec<u8>) -> Response {
    let mut response = (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response();
    response.extensions_mut().insert(Committed);
    response
}

/// A successful controller result, rendered through [`format`].
#[derive(Debug, Clone)]
pub struct Formatted<T> {
    status: StatusCode,
    data: Option<T>,
    message: String,
}

impl<T> Formatted<T> {
    pub fn new(status: StatusCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            status,
            data,
            message: message.into(),
        }
    }

    /// `200 OK` carrying `data`.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, Some(data), message)
    }
}

impl<T: Serialize> IntoResponse for Formatted<T> {
    fn into_response(self) -> Response {
        format(self.status, self.data, &self.message)
    }
}
