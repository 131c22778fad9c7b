//! Error taxonomy and response envelope types shared by the API service crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
pub use protocol::{Envelope, HealthResponse, Outcome};
