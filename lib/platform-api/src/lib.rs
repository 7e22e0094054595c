//! High-level interactions with the Serverless Platform backend.
//!
//! The GraphQL schema used for code generation is checked in at
//! `graphql/schema.graphql`.

mod client;
mod error;

pub mod config;
pub mod credentials;
pub mod graphql;
pub mod token;
pub mod types;

pub use self::{
    client::{PlatformClient, ServicePublisher},
    config::PlatformConfig,
    credentials::{CredentialStore, RcConfig},
    error::GraphQLApiFailure,
};

/// Api endpoint of the platform.
pub const GRAPHQL_ENDPOINT_URL: &str =
    "https://9iflr60nfb.execute-api.us-east-1.amazonaws.com/dev/graphql";
/// Base URL of the platform's web dashboard.
pub const PLATFORM_FRONTEND_BASE_URL: &str = "https://platform.serverless-dev.com/";

/// Version number of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
