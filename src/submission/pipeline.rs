//! Submission pipeline.
//!
//! Runs one submission through the fixed sequence of checks:
//!
//! ```text
//! rate check → parse → validate → spam check → deliver → success
//! ```
//!
//! The first failing step ends the run. Nothing is retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use tokio::time;

use crate::delivery::{DeliveryError, DeliverySink};
use crate::observability::metrics;
use crate::security::{is_spam, resolve_client_key, ClientKey, RateLimitStore};
use crate::submission::error::SubmissionError;
use crate::submission::schema::{validate, SubmissionInput, ValidatedSubmission};

/// Successful terminal states. Both produce the same response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// The sink took the submission.
    Delivered,
    /// The honeypot was filled; delivery was skipped.
    SilentlyDropped,
}

impl Acceptance {
    pub fn outcome(&self) -> &'static str {
        match self {
            Acceptance::Delivered => "delivered",
            Acceptance::SilentlyDropped => "spam",
        }
    }
}

pub struct SubmissionPipeline {
    limiter: Arc<dyn RateLimitStore>,
    sink: Arc<dyn DeliverySink>,
    delivery_timeout: Duration,
}

impl SubmissionPipeline {
    pub fn new(
        limiter: Arc<dyn RateLimitStore>,
        sink: Arc<dyn DeliverySink>,
        delivery_timeout: Duration,
    ) -> Self {
        Self {
            limiter,
            sink,
            delivery_timeout,
        }
    }

    /// Process one request. Logs and counts the terminal state.
    pub async fn process(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Acceptance, SubmissionError> {
        let client = resolve_client_key(headers);
        let result = self.run(&client, body).await;

        match &result {
            Ok(Acceptance::Delivered) => {
                tracing::info!(client = %client, sink = self.sink.name(), "Submission delivered");
            }
            Ok(Acceptance::SilentlyDropped) => {
                tracing::info!(client = %client, "Honeypot filled, dropping submission");
            }
            Err(SubmissionError::Throttled(_)) => {
                tracing::warn!(client = %client, "Rate limit exceeded");
            }
            Err(SubmissionError::Invalid(errors)) => {
                let fields: Vec<&str> = errors.iter().filter_map(|e| e.field()).collect();
                tracing::info!(client = %client, fields = ?fields, "Submission failed validation");
            }
            Err(err @ SubmissionError::Malformed(_)) => {
                tracing::warn!(client = %client, error = %err, "Unparsable submission body");
            }
            Err(err) => {
                tracing::error!(client = %client, error = %err, "Submission failed");
            }
        }

        let outcome = match &result {
            Ok(acceptance) => acceptance.outcome(),
            Err(err) => err.outcome(),
        };
        metrics::record_submission(outcome);

        result
    }

    async fn run(&self, client: &ClientKey, body: &[u8]) -> Result<Acceptance, SubmissionError> {
        if !self.limiter.admit(client) {
            return Err(SubmissionError::Throttled(client.clone()));
        }

        let body: serde_json::Value =
            serde_json::from_slice(body).map_err(SubmissionError::Malformed)?;
        let input = SubmissionInput::from_json(body).map_err(SubmissionError::Invalid)?;
        let submission = validate(&input).map_err(SubmissionError::Invalid)?;

        if is_spam(&submission) {
            return Ok(Acceptance::SilentlyDropped);
        }

        self.deliver(&submission).await?;
        Ok(Acceptance::Delivered)
    }

    /// Deliver on a separate task so a panicking sink surfaces as
    /// [`SubmissionError::Unexpected`] and a hung one can be aborted.
    async fn deliver(&self, submission: &ValidatedSubmission) -> Result<(), SubmissionError> {
        let start = Instant::now();
        let sink = self.sink.clone();
        let owned = submission.clone();
        let mut task = tokio::spawn(async move { sink.deliver(&owned).await });

        let result = match time::timeout(self.delivery_timeout, &mut task).await {
            Ok(Ok(delivered)) => delivered.map_err(SubmissionError::from),
            Ok(Err(join_error)) => Err(SubmissionError::Unexpected(format!(
                "sink '{}' task failed: {}",
                self.sink.name(),
                join_error
            ))),
            Err(_) => {
                task.abort();
                Err(DeliveryError::Timeout(self.delivery_timeout).into())
            }
        };
        metrics::record_delivery(self.sink.name(), start, result.is_ok());
        result
    }
}
