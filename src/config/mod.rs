//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (loader.rs)
//!     → OLLAMA_URL environment variable
//!     → command line overrides
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc with every request
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never mutated afterwards
//! - All fields have defaults so the proxy runs without a config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, Overrides};
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::PayloadConfig;
pub use schema::ProxyConfig;
pub use schema::RoutingConfig;
pub use schema::UpstreamConfig;
