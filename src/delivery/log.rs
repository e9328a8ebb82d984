//! Sink that writes submissions to the log.

use async_trait::async_trait;

use crate::delivery::{DeliveryError, DeliverySink};
use crate::submission::ValidatedSubmission;

pub struct LogSink {
    include_content: bool,
}

impl LogSink {
    /// With `include_content` false only the submission's size is recorded.
    pub fn new(include_content: bool) -> Self {
        Self { include_content }
    }
}

#[async_trait]
impl DeliverySink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, submission: &ValidatedSubmission) -> Result<(), DeliveryError> {
        if self.include_content {
            tracing::info!(
                name = %submission.name,
                email = %submission.email,
                message = %submission.message,
                "Contact form submission"
            );
        } else {
            tracing::info!(
                message_chars = submission.message.chars().count(),
                "Contact form submission"
            );
        }
        Ok(())
    }
}
