//! Placeholder domain operation behind `GET /api/example`.

use async_trait::async_trait;

/// The example business operation.
///
/// An empty result means "nothing to return" and is reported to the caller
/// as a domain failure; an `Err` is an unexpected failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExampleService: Send + Sync {
    async fn example(&self) -> anyhow::Result<String>;
}

/// Always returns the same greeting.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticExample;

#[async_trait]
impl ExampleService for StaticExample {
    async fn example(&self) -> anyhow::Result<String> {
        Ok("Hello World!".to_owned())
    }
}
