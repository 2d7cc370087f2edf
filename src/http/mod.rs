//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, body limit, JSON decode)
//!     → assignee.rs | comment.rs (method dispatch, one GitLab call)
//!     → response.rs (JSON envelope, status mapping)
//!     → Send to client
//! ```

pub mod assignee;
pub mod comment;
pub mod request;
pub mod response;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use request::X_REQUEST_ID;
pub use response::{ApiError, AssigneeUpdateResponse, CommentResponse, ErrorResponse, SuccessResponse};
pub use server::{build_router, AppState, HttpServer};
