//! The `/api` router: one sub-router per controller.

use axum::Router;

use crate::controllers;
use crate::server::state::AppState;

/// Compose controller routers under their mount paths.
pub fn router() -> Router<AppState> {
    Router::new().nest("/example", controllers::example::router())
}
