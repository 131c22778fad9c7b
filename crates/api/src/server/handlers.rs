//! Axum request handlers that do not belong to a controller.

use std::convert::Infallible;

use axum::{extract::Request, Json};
use common::{HealthResponse, ServiceError};

use super::state::AppState;

/// Message returned by the health probe.
pub const HEALTHY: &str = "🎉 API is running and healthy";

/// `GET /` — liveness probe. Answers with a bare `{"message": ...}` body,
/// not an envelope.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::new(HEALTHY))
}

/// Catch-all for requests no route matched.
pub async fn route_not_found(_: AppState, _: Request) -> Result<Infallible, ServiceError> {
    Err(ServiceError::not_found("Route not found", "routeNotFound"))
}
