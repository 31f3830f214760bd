//! SMTP relay transport

use async_trait::async_trait;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::config::MailConfig;

use super::{MailError, Mailer, OutgoingMail};

/// Sends mail through an authenticated TLS relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let relay = config.relay.as_deref().ok_or(MailError::MissingRelay)?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(relay)?;
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = Mailbox::new(
            Some(config.from_name.clone()),
            config.from_address.parse::<Address>()?,
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let to = Mailbox::new(
            Some(mail.to_name.clone()),
            mail.to_address.parse::<Address>()?,
        );

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(mail.html.clone())?;

        let response = self.transport.send(message).await?;
        tracing::info!(
            to = %mail.to_address,
            code = %response.code(),
            "Email handed to relay"
        );

        Ok(())
    }
}
