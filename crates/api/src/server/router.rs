//! Axum router construction.

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{adapter::adapt, handlers, middleware, state::AppState};
use crate::routes;

/// Build the application [`Router`] with all routes and middleware attached.
///
/// Stages run in this order for every request: security headers, access
/// log, CORS, error middleware, then route dispatch. Unmatched paths reach
/// the fallback, which raises a 404.
pub fn build(state: AppState, cors: CorsLayer) -> Router {
    let mut router = Router::new()
        .route(
            "/",
            get(handlers::health).fallback(adapt(handlers::route_not_found)),
        )
        .nest("/api", routes::api::router())
        .fallback(adapt(handlers::route_not_found))
        .layer(from_fn_with_state(state.clone(), middleware::handle_errors))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    for layer in middleware::security_headers() {
        router = router.layer(layer);
    }

    router.with_state(state)
}
