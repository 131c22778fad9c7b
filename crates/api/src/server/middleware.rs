//! Axum middleware layers applied to the router.
//!
//! Includes the error middleware, security and cache-control headers, and
//! the CORS policy.

use std::error::Error as StdError;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, HttpBody},
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use common::ServiceError;
use futures::TryStreamExt;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};
use tracing::warn;

use super::adapter::Forwarded;
use super::respond::{self, Committed};
use super::state::AppState;
use crate::logging::{log_message, FailureContext, FailureLog};

/// Operation tag used when a failure carries none of its own.
const UNTAGGED: &str = "unhandled";

/// How long browsers may cache a CORS preflight answer.
pub const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Terminal failure stage of the pipeline.
///
/// Runs after every other stage for the request. If the response carries a
/// [`Forwarded`] error it is logged and replaced by exactly one error
/// envelope. A response that was already committed is never written twice:
/// the failure is logged and the committed response passes through.
pub async fn handle_errors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let url = req.uri().to_string();

    let mut response = next.run(req).await;

    let Some(Forwarded(error)) = response.extensions_mut().remove::<Forwarded>() else {
        return guard_stream(response, Arc::clone(&state.log), method, url);
    };

    let (status, message) = classify(&error);
    let context = FailureContext {
        method,
        url,
        status: status.as_u16(),
        details: error_chain(&error),
    };
    let operation = error.operation().unwrap_or(UNTAGGED);
    record(
        state.log.as_ref(),
        &log_message(operation, &format!("Error: {message}")),
        &context,
    );

    if response.extensions().get::<Committed>().is_some() {
        return response;
    }

    respond::format::<()>(status, None, &message)
}

/// Map an error to the status code and message sent to the client.
fn classify(error: &ServiceError) -> (StatusCode, String) {
    match error {
        ServiceError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        ServiceError::Application { .. }
        | ServiceError::Example { .. }
        | ServiceError::NotFound { .. } => (
            StatusCode::from_u16(error.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            error.message(),
        ),
    }
}

/// The error followed by its sources, outermost first.
fn error_chain(error: &ServiceError) -> Vec<String> {
    std::iter::successors(Some(error as &(dyn StdError + 'static)), |e| (*e).source())
        .map(ToString::to_string)
        .collect()
}

/// Hand a failure to the log. A panicking sink must not stop the response.
fn record(log: &dyn FailureLog, message: &str, context: &FailureContext) {
    let logged = std::panic::catch_unwind(AssertUnwindSafe(|| log.error(message, context)));
    if logged.is_err() {
        warn!("failure log panicked; the response is sent regardless");
    }
}

/// Watch a streamed body for failures raised after the headers went out.
///
/// Such a failure cannot be turned into an envelope any more. It is logged
/// and passed on to the connection, which aborts the response. Bodies of
/// known length are returned untouched.
fn guard_stream(
    response: Response,
    log: Arc<dyn FailureLog>,
    method: String,
    url: String,
) -> Response {
    if response.body().size_hint().exact().is_some() {
        return response;
    }

    let status = response.status().as_u16();
    let (parts, body) = response.into_parts();
    let stream = body.into_data_stream().inspect_err(move |e| {
        let context = FailureContext {
            method: method.clone(),
            url: url.clone(),
            status,
            details: vec![e.to_string()],
        };
        record(
            log.as_ref(),
            &log_message("stream", &format!("Error: {e}")),
            &context,
        );
    });
    Response::from_parts(parts, Body::from_stream(stream))
}

/// Response headers set on every response: the security policy plus the
/// headers that disable caching.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'none'",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    (
        "strict-transport-security",
        "max-age=31536000; includeSubDomains",
    ),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "DENY"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
    (
        "cache-control",
        "no-store, no-cache, must-revalidate, proxy-revalidate",
    ),
    ("pragma", "no-cache"),
    ("expires", "0"),
    ("surrogate-control", "no-store"),
];

/// One overriding header layer per entry of [`SECURITY_HEADERS`].
pub fn security_headers() -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    SECURITY_HEADERS
        .iter()
        .map(|&(name, value)| {
            SetResponseHeaderLayer::overriding(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            )
        })
        .collect()
}

/// CORS policy restricted to the single configured `origin`.
pub fn cors(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::{body::to_bytes, middleware::from_fn_with_state, routing::get, Router};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::server::adapter::{adapt, forward};
    use crate::services::StaticExample;

    #[derive(Default)]
    struct RecordingLog(Mutex<Vec<(String, FailureContext)>>);

    impl FailureLog for RecordingLog {
        fn error(&self, message: &str, context: &FailureContext) {
            self.0
                .lock()
                .unwrap()
                .push((message.to_owned(), context.clone()));
        }
    }

    struct PanickingLog;

    impl FailureLog for PanickingLog {
        fn error(&self, _: &str, _: &FailureContext) {
            panic!("log sink unavailable")
        }
    }

    fn app(log: Arc<dyn FailureLog>, router: Router<AppState>) -> Router {
        let state = AppState::new(Arc::new(StaticExample), log);
        router
            .layer(from_fn_with_state(state.clone(), handle_errors))
            .with_state(state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let req = axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn application_error_uses_its_status_and_message() {
        let log = Arc::new(RecordingLog::default());
        let router = Router::new().route(
            "/teapot",
            get(adapt(|_, _| async {
                Err::<(), _>(ServiceError::application(418, "short and stout", "brew"))
            })),
        );
        let (status, body) = get_json(app(log.clone(), router), "/teapot").await;

        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(
            body,
            json!({"status": "error", "message": "short and stout", "data": null})
        );

        let entries = log.0.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "[brew] Error: short and stout");
        assert_eq!(entries[0].1.method, "GET");
        assert_eq!(entries[0].1.url, "/teapot");
        assert_eq!(entries[0].1.status, 418);
    }

    #[tokio::test]
    async fn internal_error_is_500_with_raw_message() {
        let log = Arc::new(RecordingLog::default());
        let router = Router::new().route(
            "/boom",
            get(adapt(|_, _| async {
                let inner = anyhow::anyhow!("connection reset").context("database unreachable");
                Err::<(), _>(ServiceError::from(inner))
            })),
        );
        let (status, body) = get_json(app(log.clone(), router), "/boom").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"status": "error", "message": "database unreachable", "data": null})
        );

        let entries = log.0.lock().unwrap();
        assert_eq!(entries[0].0, "[unhandled] Error: database unreachable");
        assert_eq!(
            entries[0].1.details,
            vec!["database unreachable".to_owned(), "connection reset".to_owned()]
        );
    }

    #[test]
    fn error_chain_walks_every_source() {
        let inner = anyhow::anyhow!("disk full")
            .context("write failed")
            .context("save aborted");
        assert_eq!(
            error_chain(&ServiceError::from(inner)),
            vec!["save aborted", "write failed", "disk full"]
        );
        assert_eq!(
            error_chain(&ServiceError::not_found("gone", "lookup")),
            vec!["gone"]
        );
    }

    #[tokio::test]
    async fn plain_handler_can_forward() {
        let log = Arc::new(RecordingLog::default());
        let router = Router::new().route(
            "/gone",
            get(|| async { forward(ServiceError::not_found("gone", "lookup")) }),
        );
        let (status, body) = get_json(app(log, router), "/gone").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["data"], Value::Null);
    }

    #[tokio::test]
    async fn panicking_log_does_not_block_the_response() {
        let router = Router::new().route(
            "/fail",
            get(adapt(|_, _| async {
                Err::<(), _>(ServiceError::example("Failed to get example", "getExample"))
            })),
        );
        let (status, body) = get_json(app(Arc::new(PanickingLog), router), "/fail").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Failed to get example");
    }

    #[tokio::test]
    async fn successful_response_is_untouched() {
        let log = Arc::new(RecordingLog::default());
        let router = Router::new().route(
            "/ok",
            get(adapt(|_, _| async {
                Ok::<_, ServiceError>(respond::Formatted::ok(1, "fine"))
            })),
        );
        let (status, body) = get_json(app(log.clone(), router), "/ok").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "success", "message": "fine", "data": 1}));
        assert!(log.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn committed_response_is_not_written_twice() {
        let log = Arc::new(RecordingLog::default());
        // The handler has already sent its envelope when the failure shows up.
        let router = Router::new().route(
            "/late",
            get(|| async {
                let mut resp = respond::format(StatusCode::OK, Some("partial"), "sent");
                resp.extensions_mut().insert(Forwarded(Arc::new(ServiceError::example(
                    "raised after send",
                    "late",
                ))));
                resp
            }),
        );
        let (status, body) = get_json(app(log.clone(), router), "/late").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "success", "message": "sent", "data": "partial"})
        );
        let entries = log.0.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "[late] Error: raised after send");
    }

    #[tokio::test]
    async fn failure_mid_stream_is_logged_not_rewritten() {
        let log = Arc::new(RecordingLog::default());
        let router = Router::new().route(
            "/stream",
            get(|| async {
                let chunks = futures::stream::iter(vec![
                    Ok::<_, std::io::Error>("partial"),
                    Err(std::io::Error::other("upstream hung up")),
                ]);
                Body::from_stream(chunks)
            }),
        );
        let req = axum::http::Request::builder()
            .uri("/stream")
            .body(Body::empty())
            .unwrap();
        let resp = app(log.clone(), router).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(to_bytes(resp.into_body(), usize::MAX).await.is_err());

        let entries = log.0.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].0.starts_with("[stream] Error:"));
        assert_eq!(entries[0].1.url, "/stream");
    }

    #[test]
    fn security_header_table_is_valid() {
        assert_eq!(security_headers().len(), SECURITY_HEADERS.len());
    }
}
