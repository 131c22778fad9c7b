//! Controller for the `/example` resource.

use axum::{extract::Request, routing::get, Router};
use common::ServiceError;

use crate::server::adapter::adapt;
use crate::server::handlers::route_not_found;
use crate::server::respond::Formatted;
use crate::server::state::AppState;

/// Routes mounted under `/example`. Other methods on the same path are
/// reported as unmatched routes.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(adapt(get_example)).fallback(adapt(route_not_found)),
    )
}

/// `GET /example` — runs the example operation and returns its result.
async fn get_example(state: AppState, _req: Request) -> Result<Formatted<String>, ServiceError> {
    let result = state.example.example().await?;

    if result.is_empty() {
        return Err(ServiceError::example("Failed to get example", "getExample"));
    }

    Ok(Formatted::ok(result, "Example fetched successfully"))
}
