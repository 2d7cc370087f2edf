//! Merge request bridge library.
//!
//! Simplified JSON endpoints for a GitLab merge request's assignees and
//! comments, forwarded one-to-one to the GitLab REST API.

pub mod config;
pub mod gitlab;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::BridgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
