//! Controllers: each one owns the routes of one resource.

pub mod example;
