//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Own the pooled connection to the upstream, shared by every request
//! - Enforce the optional connect and response deadlines
//!
//! # Design Decisions
//! - No deadline by default: model loading and long generations can keep
//!   the upstream silent for minutes
//! - The deadline covers the response head only, streamed bodies are not cut
//! - No retries, a failed call is reported as is

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::UpstreamConfig;

/// Transport level failure talking to the upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// Cloneable handle to the shared upstream connection pool.
#[derive(Clone)]
pub struct UpstreamClient {
    inner: Client<HttpConnector, Body>,
    timeout: Option<Duration>,
}

impl UpstreamClient {
    /// Create a client for the given upstream settings.
    pub fn new(config: &UpstreamConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(config.connect_timeout_secs.map(Duration::from_secs));

        let inner = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            inner,
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Send a request and wait for the response head.
    pub async fn send(&self, req: Request<Body>) -> Result<Response<Incoming>, UpstreamError> {
        let pending = self.inner.request(req);
        match self.timeout {
            Some(deadline) => tokio::time::timeout(deadline, pending)
                .await
                .map_err(|_| UpstreamError::Timeout(deadline))?
                .map_err(UpstreamError::Transport),
            None => pending.await.map_err(UpstreamError::Transport),
        }
    }
}
