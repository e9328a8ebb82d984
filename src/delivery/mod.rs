//! Delivery of accepted submissions.
//!
//! # Data Flow
//! ```text
//! ValidatedSubmission (not spam)
//!     → pipeline wraps the call in the delivery timeout
//!     → DeliverySink::deliver
//!         log.rs      (tracing record)
//!         webhook.rs  (JSON POST)
//!         smtp.rs     (email to the site owner)
//! ```
//!
//! # Design Decisions
//! - One sink per process, chosen by config at startup
//! - Sinks never retry; the caller resubmits
//! - Error detail stays in the logs, the caller only sees a generic 500

pub mod log;
pub mod smtp;
pub mod webhook;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{DeliveryConfig, SinkConfig};
use crate::submission::ValidatedSubmission;

pub use log::LogSink;
pub use smtp::SmtpSink;
pub use webhook::WebhookSink;

/// Errors that can occur while handing a submission downstream.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The sink did not answer within the delivery timeout.
    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP request to the sink failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The sink answered with a non-success status.
    #[error("Sink rejected submission with status {0}")]
    Rejected(u16),

    /// The outbound message could not be assembled.
    #[error("Could not build message: {0}")]
    Message(String),

    /// SMTP session failed.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Sink settings unusable.
    #[error("Sink misconfigured: {0}")]
    Config(String),
}

/// Downstream consumer of accepted submissions.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Short label used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn deliver(&self, submission: &ValidatedSubmission) -> Result<(), DeliveryError>;
}

/// Construct the sink selected in config.
pub fn build_sink(
    config: &DeliveryConfig,
    log_submissions: bool,
) -> Result<Arc<dyn DeliverySink>, DeliveryError> {
    let sink: Arc<dyn DeliverySink> = match &config.sink {
        SinkConfig::Log => Arc::new(LogSink::new(log_submissions)),
        SinkConfig::Webhook { url, bearer_token } => {
            Arc::new(WebhookSink::new(url, bearer_token.clone())?)
        }
        SinkConfig::Smtp(smtp) => Arc::new(SmtpSink::new(smtp)?),
    };
    tracing::info!(sink = sink.name(), "Delivery sink ready");
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_configured_sink() {
        let mut config = DeliveryConfig::default();
        assert_eq!(build_sink(&config, false).unwrap().name(), "log");

        config.sink = SinkConfig::Webhook {
            url: "http://127.0.0.1:9/hook".into(),
            bearer_token: None,
        };
        assert_eq!(build_sink(&config, false).unwrap().name(), "webhook");
    }

    #[test]
    fn test_bad_webhook_url_is_config_error() {
        let config = DeliveryConfig {
            sink: SinkConfig::Webhook {
                url: "not a url".into(),
                bearer_token: None,
            },
            ..DeliveryConfig::default()
        };
        assert!(matches!(build_sink(&config, false), Err(DeliveryError::Config(_))));
    }
}
