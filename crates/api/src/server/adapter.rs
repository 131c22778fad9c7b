//! Adapter that turns a fallible async handler into an axum handler.
//!
//! Controllers are written as straight-line code returning
//! `Result<_, ServiceError>`. [`adapt`] runs them and guarantees exactly one
//! of two outcomes per call: the success value is converted into the
//! response, or the failure (an `Err` or a panic) is forwarded to the error
//! middleware through a [`Forwarded`] response extension. The adapter never
//! writes an error body itself.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::ServiceError;
use futures::future::{BoxFuture, FutureExt};

use super::state::AppState;

/// A failure travelling from a handler to the error middleware.
#[derive(Debug, Clone)]
pub struct Forwarded(pub Arc<ServiceError>);

/// Build the bodiless response that carries `error` to the error middleware.
///
/// Usable by plain axum handlers that do not go through [`adapt`].
pub fn forward(error: ServiceError) -> Response {
    let mut response = Response::default();
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.extensions_mut().insert(Forwarded(Arc::new(error)));
    response
}

/// Wrap `handler` so that it can be registered directly with the router.
pub fn adapt<F, Fut, R>(
    handler: F,
) -> impl Fn(State<AppState>, Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
where
    F: Fn(AppState, Request) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ServiceError>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    move |State(state): State<AppState>, req: Request| {
        let handler = handler.clone();
        async move {
            let outcome = AssertUnwindSafe(async move { handler(state, req).await })
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(value)) => value.into_response(),
                Ok(Err(error)) => forward(error),
                Err(panic) => forward(ServiceError::Internal(anyhow::anyhow!(
                    "{}",
                    panic_message(panic.as_ref())
                ))),
            }
        }
        .boxed()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "handler panicked"
    }
}
