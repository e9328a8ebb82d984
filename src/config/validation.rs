//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows and timeouts > 0, addresses parse)
//! - Check sink settings are usable before the first submission arrives
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{GatewayConfig, SinkConfig};

/// Upper bound on `rate_limit.window_secs` (one week).
pub const MAX_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending key, e.g. `rate_limit.window_secs`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if !config.listener.submission_path.starts_with('/') {
        errors.push(ValidationError::new(
            "listener.submission_path",
            "must start with '/'",
        ));
    }

    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::new("rate_limit.window_secs", "must be greater than 0"));
    } else if config.rate_limit.window_secs > MAX_WINDOW_SECS {
        errors.push(ValidationError::new(
            "rate_limit.window_secs",
            format!("must not exceed {}", MAX_WINDOW_SECS),
        ));
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::new("rate_limit.max_requests", "must be greater than 0"));
    }
    if config.rate_limit.sweep_interval_secs == 0 {
        errors.push(ValidationError::new(
            "rate_limit.sweep_interval_secs",
            "must be greater than 0",
        ));
    }

    if config.delivery.timeout_secs == 0 {
        errors.push(ValidationError::new("delivery.timeout_secs", "must be greater than 0"));
    }
    match &config.delivery.sink {
        SinkConfig::Log => {}
        SinkConfig::Webhook { url, .. } => match url::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => errors.push(ValidationError::new(
                "delivery.sink.url",
                format!("unsupported scheme '{}'", parsed.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new(
                "delivery.sink.url",
                format!("invalid URL: {}", e),
            )),
        },
        SinkConfig::Smtp(smtp) => {
            if smtp.host.trim().is_empty() {
                errors.push(ValidationError::new("delivery.sink.host", "must not be empty"));
            }
            if !smtp.from.contains('@') {
                errors.push(ValidationError::new("delivery.sink.from", "must be a mailbox"));
            }
            if !smtp.to.contains('@') {
                errors.push(ValidationError::new("delivery.sink.to", "must be a mailbox"));
            }
            if smtp.username.is_some() != smtp.password.is_some() {
                errors.push(ValidationError::new(
                    "delivery.sink.username",
                    "username and password must be set together",
                ));
            }
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    } else if config.delivery.timeout_secs >= config.timeouts.request_secs {
        // the request deadline would cut delivery off with a bare 408
        errors.push(ValidationError::new(
            "delivery.timeout_secs",
            format!(
                "must be less than timeouts.request_secs ({})",
                config.timeouts.request_secs
            ),
        ));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
