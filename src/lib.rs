//! CORS-enabling reverse proxy for a local Ollama server.
//!
//! Browsers cannot call the Ollama API directly from another origin because
//! it sends no CORS headers. This proxy forwards every request under `/api/`
//! to the upstream unchanged, answers preflight requests itself, adds the
//! CORS headers to every response, and cleans up line-wrapped base64 images
//! in JSON request bodies on the way through.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod payload;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
