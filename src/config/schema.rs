//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the intake gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, endpoint path).
    pub listener: ListenerConfig,

    /// Fixed-window rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Downstream delivery of accepted submissions.
    pub delivery: DeliveryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Path of the single POST submission endpoint.
    pub submission_path: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            submission_path: "/api/contact".to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Length of one fixed window in seconds.
    pub window_secs: u64,

    /// Requests admitted per client key per window.
    pub max_requests: u32,

    /// Interval between reaper sweeps in seconds.
    pub sweep_interval_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 10 * 60,
            max_requests: 5,
            sweep_interval_secs: 5 * 60,
        }
    }
}

/// Delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Upper bound on a single sink invocation in seconds.
    pub timeout_secs: u64,

    /// Which sink receives accepted submissions.
    pub sink: SinkConfig,
}

impl DeliveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            sink: SinkConfig::Log,
        }
    }
}

/// Delivery sink selection, tagged by `kind`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    /// Write submissions to the log.
    #[default]
    Log,

    /// POST submissions as JSON to an HTTP endpoint.
    Webhook {
        url: String,
        #[serde(default)]
        bearer_token: Option<String>,
    },

    /// Send submissions as email.
    Smtp(SmtpConfig),
}

/// SMTP relay settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    pub host: String,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Sender mailbox, e.g. "Contact Form <noreply@example.com>".
    pub from: String,

    /// Recipient mailbox.
    pub to: String,

    #[serde(default)]
    pub tls: SmtpTls,
}

fn default_smtp_port() -> u16 {
    587
}

/// Transport security for the SMTP connection.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SmtpTls {
    None,
    #[default]
    Starttls,
    Tls,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log line format.
    pub log_format: LogFormat,

    /// Include submission content in log records.
    pub log_submissions: bool,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Address the Prometheus exporter listens on.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_submissions: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.submission_path, "/api/contact");
        assert_eq!(config.rate_limit.window(), Duration::from_secs(600));
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.sweep_interval(), Duration::from_secs(300));
        assert!(matches!(config.delivery.sink, SinkConfig::Log));
    }

    #[test]
    fn test_tagged_sink_sections() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [delivery.sink]
            kind = "webhook"
            url = "https://hooks.example.com/contact"
            "#,
        )
        .unwrap();
        match config.delivery.sink {
            SinkConfig::Webhook { url, bearer_token } => {
                assert_eq!(url, "https://hooks.example.com/contact");
                assert!(bearer_token.is_none());
            }
            other => panic!("unexpected sink: {:?}", other),
        }

        let config: GatewayConfig = toml::from_str(
            r#"
            [delivery.sink]
            kind = "smtp"
            host = "smtp.example.com"
            from = "Contact <noreply@example.com>"
            to = "owner@example.com"
            tls = "tls"
            "#,
        )
        .unwrap();
        match config.delivery.sink {
            SinkConfig::Smtp(smtp) => {
                assert_eq!(smtp.port, 587);
                assert_eq!(smtp.tls, SmtpTls::Tls);
            }
            other => panic!("unexpected sink: {:?}", other),
        }
    }
}
