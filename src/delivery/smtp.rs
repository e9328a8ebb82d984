//! Sink that emails submissions to the site owner.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{SmtpConfig, SmtpTls};
use crate::delivery::{DeliveryError, DeliverySink};
use crate::submission::ValidatedSubmission;

pub struct SmtpSink {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpSink {
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| DeliveryError::Config(format!("invalid from mailbox: {}", e)))?;
        let to: Mailbox = config
            .to
            .parse()
            .map_err(|e| DeliveryError::Config(format!("invalid recipient mailbox: {}", e)))?;

        let tls = match config.tls {
            SmtpTls::None => Tls::None,
            SmtpTls::Starttls => Tls::Required(TlsParameters::new(config.host.clone())?),
            SmtpTls::Tls => Tls::Wrapper(TlsParameters::new(config.host.clone())?),
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(tls);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
            to,
        })
    }
}

/// Assemble the notification email for one submission.
pub fn build_message(
    submission: &ValidatedSubmission,
    from: Mailbox,
    to: Mailbox,
) -> Result<Message, DeliveryError> {
    let address: Address = submission
        .email
        .parse()
        .map_err(|e| DeliveryError::Message(format!("unusable reply-to address: {}", e)))?;
    let reply_to = Mailbox::new(Some(submission.name.clone()), address);

    Message::builder()
        .from(from)
        .to(to)
        .reply_to(reply_to)
        .subject(format!("New contact from {}", submission.name))
        .header(ContentType::TEXT_PLAIN)
        .body(submission.message.clone())
        .map_err(|e| DeliveryError::Message(e.to_string()))
}

#[async_trait]
impl DeliverySink for SmtpSink {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn deliver(&self, submission: &ValidatedSubmission) -> Result<(), DeliveryError> {
        let email = build_message(submission, self.from.clone(), self.to.clone())?;
        let response = self.mailer.send(email).await?;
        tracing::debug!(code = %response.code(), "SMTP relay accepted submission");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> ValidatedSubmission {
        ValidatedSubmission {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            message: "Hello from the contact form".into(),
            website: None,
        }
    }

    #[test]
    fn test_message_headers() {
        let from: Mailbox = "Contact Form <noreply@example.com>".parse().unwrap();
        let to: Mailbox = "owner@example.com".parse().unwrap();
        let message = build_message(&submission(), from, to).unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: New contact from Alice"));
        assert!(raw.contains("Reply-To: Alice <alice@example.com>"));
        assert!(raw.contains("Hello from the contact form"));
    }

    #[test]
    fn test_rejects_bad_mailbox_config() {
        let config = SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: None,
            password: None,
            from: "not a mailbox".into(),
            to: "owner@example.com".into(),
            tls: SmtpTls::None,
        };
        assert!(matches!(SmtpSink::new(&config), Err(DeliveryError::Config(_))));
    }
}
