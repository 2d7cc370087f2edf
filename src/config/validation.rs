//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that the served merge request can be identified
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::BridgeConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("gitlab.base_url '{0}' is not a valid http(s) URL")]
    BaseUrl(String),

    #[error("gitlab.token is empty and GITLAB_TOKEN is not set")]
    MissingToken,

    #[error("gitlab.project_id must be set")]
    MissingProject,

    #[error("either gitlab.merge_request_iid or gitlab.source_branch must be set")]
    MissingMergeRequest,

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("timeouts.request_secs ({request_secs}) must be greater than gitlab.timeout_secs ({gitlab_secs})")]
    TimeoutOrder { request_secs: u64, gitlab_secs: u64 },

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration for semantic errors.
///
/// The token is expected to have been resolved (file or environment) already.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    match url::Url::parse(&config.gitlab.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::BaseUrl(config.gitlab.base_url.clone())),
    }

    if config.gitlab.token.trim().is_empty() {
        errors.push(ValidationError::MissingToken);
    }

    if config.gitlab.project_id.trim().is_empty() {
        errors.push(ValidationError::MissingProject);
    }

    if config.gitlab.merge_request_iid.is_none() && config.gitlab.source_branch.trim().is_empty() {
        errors.push(ValidationError::MissingMergeRequest);
    }

    if config.gitlab.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("gitlab.timeout_secs"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }

    if config.gitlab.timeout_secs > 0
        && config.timeouts.request_secs > 0
        && config.timeouts.request_secs <= config.gitlab.timeout_secs
    {
        errors.push(ValidationError::TimeoutOrder {
            request_secs: config.timeouts.request_secs,
            gitlab_secs: config.gitlab.timeout_secs,
        });
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("security.max_body_size"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
