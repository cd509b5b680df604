use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, warn};

use crate::core::config::MailConfig;
use crate::core::error::{AppError, Result};
use crate::modules::mail::{MailBody, Mailer, OutgoingMail};

/// SMTP relay client (STARTTLS)
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    /// Build the transport from config. Returns a disabled mailer when SMTP
    /// credentials are absent or still the sample placeholder.
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        if !config.is_enabled() {
            warn!("SMTP is not configured; outgoing mail is disabled");
            return Ok(Self::disabled());
        }

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::Internal(format!("Invalid SMTP relay: {}", e)))?
            .port(config.smtp_port);

        if let Some(username) = &config.smtp_username {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                config.smtp_password.clone().unwrap_or_default(),
            ));
        }

        info!(
            "SMTP mailer ready: {}:{}",
            config.smtp_host, config.smtp_port
        );

        Ok(Self {
            transport: Some(builder.build()),
        })
    }

    pub fn disabled() -> Self {
        Self { transport: None }
    }

    fn build_message(mail: OutgoingMail) -> Result<Message> {
        let from_address: Address = mail
            .from_email
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid sender address: {}", e)))?;
        let to_address: Address = mail.to.parse().map_err(|e| {
            AppError::BadRequest(format!("Invalid recipient address '{}': {}", mail.to, e))
        })?;

        let content_type = match mail.kind {
            MailBody::Html => ContentType::TEXT_HTML,
            MailBody::Text => ContentType::TEXT_PLAIN,
        };

        Message::builder()
            .from(Mailbox::new(mail.from_name, from_address))
            .to(Mailbox::new(None, to_address))
            .subject(mail.subject)
            .header(content_type)
            .body(mail.body)
            .map_err(|e| AppError::Internal(format!("Failed to build mail: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| AppError::ServiceUnavailable("Mail is not configured".to_string()))?;

        let to = mail.to.clone();
        let message = Self::build_message(mail)?;

        transport.send(message).await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to send mail to {}: {}", to, e))
        })?;

        debug!("Mail delivered to {}", to);
        Ok(())
    }
}
