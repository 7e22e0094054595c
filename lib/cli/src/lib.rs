//! The `sls-platform` binary lib
//!
//! Publishes the description of a deployed Serverless service (its functions,
//! their HTTP endpoints and readmes) to the Serverless Platform.

#![deny(
    dead_code,
    nonstandard_style,
    unused_mut,
    unused_variables,
    unused_unsafe,
    unreachable_patterns
)]

pub mod cli;
pub mod commands;
pub mod endpoint;
pub mod logging;
pub mod manifest;
pub mod opts;
pub mod provider;
pub mod publisher;
pub mod service;

/// Version number of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
