//! Telemetry setup: structured logs, plus spans exported over OTLP when an
//! endpoint is configured.
//!
//! # Telemetry invariants
//!
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.
//! - Error details never reach clients; they are written to the log only.

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
