//! Delivers alert notifications through an SMTP relay.

use crate::config::EmailConfig;
use crate::core::EmailSender;
use crate::error::DeliveryError;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use lettre::message::{
    header::{self, ContentType},
    Mailbox, Mailboxes,
};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{error, info, instrument};

/// Sends plain-text emails from a fixed sender to a fixed recipient list.
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailboxes,
    timeout: Duration,
}

impl SmtpEmailSender {
    /// Creates a new `SmtpEmailSender`.
    ///
    /// `config.to` may hold several comma-separated recipients. Fails if any
    /// address cannot be parsed or the relay cannot be set up for STARTTLS.
    /// No connection is made until the first send.
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .with_context(|| format!("Invalid sender address '{}'", config.from))?;
        let to: Mailboxes = config
            .to
            .parse()
            .with_context(|| format!("Invalid recipient address '{}'", config.to))?;
        if to.iter().next().is_none() {
            bail!("No recipient address in '{}'", config.to);
        }
        let timeout = Duration::from_secs(config.timeout_seconds);

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
                .with_context(|| format!("Failed to set up SMTP relay '{}'", config.smtp_server))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_server)
        };
        let transport = builder
            .port(config.smtp_port)
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from,
            to,
            timeout,
        })
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message, DeliveryError> {
        Message::builder()
            .from(self.from.clone())
            .mailbox(header::To::from(self.to.clone()))
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DeliveryError::Email(e.to_string()))
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    #[instrument(skip(self, body), fields(to = %self.to))]
    async fn send_email(&self, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let message = self.build_message(subject, body)?;

        // The transport's own timeout only bounds the TCP connect.
        match tokio::time::timeout(self.timeout, self.transport.send(message)).await {
            Ok(Ok(_)) => {
                info!("Email sent successfully.");
                Ok(())
            }
            Ok(Err(e)) => {
                error!(error = %e, "Email sending failed");
                Err(DeliveryError::Email(e.to_string()))
            }
            Err(_) => {
                error!(timeout = ?self.timeout, "Email sending timed out");
                Err(DeliveryError::Email(format!(
                    "SMTP session timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
        }
    }
}
