//! Domain operations invoked by controllers.

pub mod example;

pub use example::{ExampleService, StaticExample};
