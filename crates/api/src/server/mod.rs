//! Axum HTTP server: the request/response/error pipeline.
//!
//! # Responsibilities
//! - Render every enveloped body through one formatter ([`respond`]).
//! - Forward handler failures to the error middleware ([`adapter`]).
//! - Classify, log and answer failures in one place ([`middleware`]).
//! - Define the Axum router with all routes and shared middleware.
//! - Inject shared application state (`AppState`) into handlers.

pub mod adapter;
pub mod handlers;
pub mod middleware;
pub mod respond;
pub mod router;
pub mod shutdown;
pub mod state;
