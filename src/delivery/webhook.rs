//! Sink that POSTs submissions to an HTTP endpoint.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::delivery::{DeliveryError, DeliverySink};
use crate::submission::ValidatedSubmission;

/// Body sent to the webhook.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
    /// Seconds since the Unix epoch.
    pub submitted_at: u64,
}

pub struct WebhookSink {
    client: reqwest::Client,
    url: Url,
    bearer_token: Option<String>,
}

impl WebhookSink {
    pub fn new(url: &str, bearer_token: Option<String>) -> Result<Self, DeliveryError> {
        let url = Url::parse(url)
            .map_err(|e| DeliveryError::Config(format!("invalid webhook URL '{}': {}", url, e)))?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("intake-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url,
            bearer_token,
        })
    }
}

#[async_trait]
impl DeliverySink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, submission: &ValidatedSubmission) -> Result<(), DeliveryError> {
        let payload = WebhookPayload {
            name: &submission.name,
            email: &submission.email,
            message: &submission.message,
            submitted_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };

        let mut request = self.client.post(self.url.clone()).json(&payload);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected(status.as_u16()));
        }

        tracing::debug!(url = %self.url, status = %status, "Webhook accepted submission");
        Ok(())
    }
}
