//! `api` — service binary entry point.
//!
//! Startup sequence:
//! 1. Merge `.env` into the environment, then load and validate [`Config`].
//!    A missing `PORT` or `CLIENT_ORIGIN_URL` stops the process here.
//! 2. Initialise telemetry.
//! 3. Build the shared [`AppState`] and the Axum router.
//! 4. Bind the listener and serve until SIGINT/SIGTERM.

mod config;
mod controllers;
mod logging;
mod routes;
mod server;
mod services;
mod telemetry;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use logging::TracingLog;
use server::{middleware, state::AppState};
use services::StaticExample;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    // A missing .env file is fine; the variables may come from the process.
    let _ = dotenvy::dotenv();

    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;
    let cors = middleware::cors(cfg.allowed_origin()?);

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        production = cfg.is_production(),
        "api starting"
    );

    // -----------------------------------------------------------------------
    // 3. Application state and router
    // -----------------------------------------------------------------------
    let state = AppState::new(
        Arc::new(StaticExample),
        Arc::new(TracingLog::new(cfg.is_production())),
    );
    let router = server::router::build(state, cors);

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown::signal())
        .await
        .context("HTTP server failed")?;

    info!("server stopped");
    telemetry::shutdown_telemetry();
    Ok(())
}
