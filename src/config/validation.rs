//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the upstream URL (plain HTTP, has a host)
//! - Validate socket addresses and the route prefix
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("upstream.url `{0}` is not a valid URL")]
    InvalidUpstreamUrl(String),
    #[error("upstream.url `{0}` must use the http scheme")]
    UnsupportedUpstreamScheme(String),
    #[error("upstream.url `{0}` has no host")]
    MissingUpstreamHost(String),
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),
    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
    #[error("routing.path_prefix `{0}` must start and end with '/'")]
    InvalidPathPrefix(String),
    #[error("routing.allowed_methods entry `{0}` is not an HTTP method")]
    InvalidMethod(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let upstream = &config.upstream.url;
    match Url::parse(upstream) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::UnsupportedUpstreamScheme(upstream.clone()));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::MissingUpstreamHost(upstream.clone()));
            }
        }
        Err(_) => errors.push(ValidationError::InvalidUpstreamUrl(upstream.clone())),
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let prefix = &config.routing.path_prefix;
    if !prefix.starts_with('/') || !prefix.ends_with('/') {
        errors.push(ValidationError::InvalidPathPrefix(prefix.clone()));
    }

    for method in &config.routing.allowed_methods {
        if Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
