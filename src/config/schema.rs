//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Upstream used when neither the config file nor `OLLAMA_URL` names one.
pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:11434";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Which requests are proxied.
    pub routing: RoutingConfig,

    /// Request body handling.
    pub payload: PayloadConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream (inference server) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL, scheme + host + port. Request paths are appended verbatim.
    pub url: String,

    /// Deadline for receiving response headers. `None` means no explicit deadline.
    pub timeout_secs: Option<u64>,

    /// Deadline for establishing the TCP connection. `None` means no explicit deadline.
    pub connect_timeout_secs: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

/// Route configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Path prefix handled by the proxy. Must start and end with `/`.
    pub path_prefix: String,

    /// Methods accepted besides `OPTIONS`. Empty accepts every method.
    pub allowed_methods: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/api/".to_string(),
            allowed_methods: Vec::new(),
        }
    }
}

/// Request body handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PayloadConfig {
    /// Strip whitespace from base64 strings in a top-level `images` array.
    pub normalize_images: bool,

    /// Upper bound on buffered request bodies. `None` reads bodies of any size.
    pub max_body_bytes: Option<usize>,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            normalize_images: true,
            max_body_bytes: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for terminals.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
