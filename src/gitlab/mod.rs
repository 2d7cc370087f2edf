//! Upstream GitLab integration.
//!
//! # Data Flow
//! ```text
//! handler
//!     → MergeRequestApi (client.rs, trait seam)
//!     → GitlabClient (reqwest, PRIVATE-TOKEN auth)
//!     → GitLab REST API v4
//! ```

pub mod client;
pub mod line_code;
pub mod types;

pub use client::{GitlabClient, MergeRequestApi};
pub use line_code::line_code;
pub use types::{GitlabError, GitlabResult, ProjectInfo};
