//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "INTAKE_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {var}")]
    Env { var: String, value: String },

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

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;
    finish(config)
}

/// Load configuration from an optional file, then apply `INTAKE_*` overrides.
///
/// Without a file the built-in defaults are the starting point.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finish(GatewayConfig::default()),
    }
}

fn finish(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment values onto `config`.
///
/// `lookup` receives the full variable name; tests pass a closure over a map.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |suffix: &str| {
        let var = format!("{}{}", ENV_PREFIX, suffix);
        lookup(&var).map(|value| (var, value))
    };

    if let Some((_, value)) = get("BIND_ADDRESS") {
        config.listener.bind_address = value;
    }
    if let Some((_, value)) = get("SUBMISSION_PATH") {
        config.listener.submission_path = value;
    }
    if let Some((var, value)) = get("RATE_LIMIT_WINDOW_SECS") {
        config.rate_limit.window_secs = parse_var(var, value)?;
    }
    if let Some((var, value)) = get("RATE_LIMIT_MAX_REQUESTS") {
        config.rate_limit.max_requests = parse_var(var, value)?;
    }
    if let Some((var, value)) = get("RATE_LIMIT_SWEEP_INTERVAL_SECS") {
        config.rate_limit.sweep_interval_secs = parse_var(var, value)?;
    }
    if let Some((var, value)) = get("DELIVERY_TIMEOUT_SECS") {
        config.delivery.timeout_secs = parse_var(var, value)?;
    }
    Ok(())
}

fn parse_var<T: FromStr>(var: String, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}
