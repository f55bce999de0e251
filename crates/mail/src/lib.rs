//! Outbound email for account flows.
//!
//! Handlers depend on the [`Mailer`] trait so tests can capture messages
//! instead of talking to an SMTP server. [`SmtpMailer`] is the production
//! implementation; [`DisabledMailer`] is installed when SMTP is not configured.

pub mod config;
pub mod error;
pub mod smtp;
pub mod template;

use async_trait::async_trait;

pub use config::EmailConfig;
pub use error::EmailError;
pub use smtp::SmtpMailer;
pub use template::EmailMessage;

/// Delivers a rendered message to a single recipient.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Mailer used when `SMTP_HOST` is unset. Every send fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<(), EmailError> {
        tracing::warn!(to, subject = %message.subject, "Email delivery is not configured");
        Err(EmailError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_mailer_rejects_every_send() {
        let message = template::password_reset("123456", 15);
        let result = DisabledMailer.send("a@example.com", &message).await;
        assert!(matches!(result, Err(EmailError::NotConfigured)));
    }
}
