//! Terminal failure states of the submission pipeline.

use thiserror::Error;

use crate::delivery::DeliveryError;
use crate::security::ClientKey;
use crate::submission::schema::FieldError;

/// Every way a submission can fail to be accepted.
///
/// Detected spam is not here: it leaves the pipeline as
/// [`Acceptance::SilentlyDropped`](crate::submission::Acceptance).
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The client used up its quota for the current window.
    #[error("Client {0} exceeded the rate limit")]
    Throttled(ClientKey),

    /// The body is not JSON at all.
    #[error("Body is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The body parsed but one or more fields broke a rule.
    #[error("Validation failed for {}", failing_fields(.0))]
    Invalid(Vec<FieldError>),

    /// The sink failed or timed out.
    #[error("Delivery failed: {0}")]
    DeliveryFailed(#[from] DeliveryError),

    /// The delivery task panicked or was cancelled. Panics elsewhere in
    /// request handling are caught by the HTTP panic layer instead.
    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl SubmissionError {
    /// Metric/log label for this terminal state.
    pub fn outcome(&self) -> &'static str {
        match self {
            SubmissionError::Throttled(_) => "throttled",
            SubmissionError::Malformed(_) => "malformed",
            SubmissionError::Invalid(_) => "invalid",
            SubmissionError::DeliveryFailed(_) => "delivery_failed",
            SubmissionError::Unexpected(_) => "unexpected",
        }
    }
}

fn failing_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.field().unwrap_or("<body>"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_display_names_fields() {
        let err = SubmissionError::Invalid(vec![
            FieldError::new("name", "Required"),
            FieldError::new("email", "Required"),
        ]);
        assert_eq!(err.to_string(), "Validation failed for name, email");
        assert_eq!(err.outcome(), "invalid");
    }

    #[test]
    fn test_delivery_error_converts() {
        let err: SubmissionError = DeliveryError::Rejected(503).into();
        assert_eq!(err.outcome(), "delivery_failed");
        assert_eq!(
            err.to_string(),
            "Delivery failed: Sink rejected submission with status 503"
        );
    }
}
