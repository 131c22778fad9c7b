//! Configuration loading and validation for the API service.
//!
//! All values are read from environment variables at startup, after an
//! optional `.env` file has been merged into the environment. The process
//! exits with a clear error message if any required variable is missing or
//! invalid, before any socket is bound.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use serde::Deserialize;

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// TCP port the HTTP server listens on. **Required.**
    pub port: u16,

    /// The single origin allowed to make cross-origin requests. **Required.**
    pub client_origin_url: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format: `"json"` or `"pretty"`.
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Deployment environment. Error details are only logged outside
    /// `"production"`.
    #[serde(default = "default_app_env")]
    pub app_env: String,

    /// OTLP endpoint for span export. Export is disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "json".into()
}
fn default_app_env() -> String {
    "production".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::default())
    }

    fn load(source: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(source)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration (PORT and CLIENT_ORIGIN_URL are required)")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("PORT must be a non-zero TCP port");
        }
        if self.client_origin_url.trim().is_empty() {
            anyhow::bail!("CLIENT_ORIGIN_URL is required and must not be empty");
        }
        HeaderValue::from_str(&self.client_origin_url)
            .context("CLIENT_ORIGIN_URL is not a valid origin header value")?;
        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            anyhow::bail!("LOG_FORMAT must be `json` or `pretty`, got `{}`", self.log_format);
        }
        Ok(())
    }

    /// Whether the service runs in production mode.
    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// The allowed CORS origin as a header value.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin is not a valid header value. Cannot
    /// happen for a [`Config`] that passed validation.
    pub fn allowed_origin(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.client_origin_url)
            .context("CLIENT_ORIGIN_URL is not a valid origin header value")
    }
}
