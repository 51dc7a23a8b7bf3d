//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the upstream base URL.
pub const UPSTREAM_ENV_VAR: &str = "OLLAMA_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values supplied on the command line. They win over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub upstream_url: Option<String>,
}

/// Build the process configuration.
///
/// Sources are applied in order, later ones winning: defaults, the optional
/// TOML file, `OLLAMA_URL`, then command line overrides. The result is
/// validated before it is returned.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<ProxyConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    resolve(config, overrides, |key| std::env::var(key).ok())
}

/// Apply environment and command line overrides, normalize, then validate.
pub fn resolve<F>(mut config: ProxyConfig, overrides: &Overrides, env: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(UPSTREAM_ENV_VAR).filter(|url| !url.is_empty()) {
        config.upstream.url = url;
    }
    if let Some(url) = &overrides.upstream_url {
        config.upstream.url = url.clone();
    }
    if let Some(addr) = &overrides.bind_address {
        config.listener.bind_address = addr.clone();
    }

    // Paths always start with '/', so a trailing one here would double up.
    if let Some(trimmed) = config.upstream.url.strip_suffix('/') {
        config.upstream.url = trimmed.to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
