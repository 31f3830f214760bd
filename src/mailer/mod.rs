//! Outbound email
//!
//! Reminders go through the [`Mailer`] trait. Production uses an SMTP relay,
//! development can log the rendered message instead.

pub mod smtp;
pub mod template;

use async_trait::async_trait;

pub use smtp::SmtpMailer;
pub use template::inactivity_reminder;

use crate::config::{MailConfig, MailTransport};

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to_address: String,
    pub to_name: String,
    pub subject: String,
    pub html: String,
}

/// Delivery backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Development transport that writes messages to the log
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            to = %mail.to_address,
            subject = %mail.subject,
            bytes = mail.html.len(),
            "Mail transport is 'log'; message not delivered"
        );
        Ok(())
    }
}

/// Build the mailer selected by configuration
pub fn from_config(config: &MailConfig) -> Result<Box<dyn Mailer>, MailError> {
    match config.transport {
        MailTransport::Smtp => Ok(Box::new(SmtpMailer::new(config)?)),
        MailTransport::Log => Ok(Box::new(LogMailer)),
    }
}

/// Mail delivery errors
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("smtp relay is not configured")]
    MissingRelay,
}
