//! Outbound mail
//!
//! `Mailer` is the seam between the features and the SMTP relay. The
//! production implementation wraps a lettre transport; when SMTP is not
//! configured the same type is built in a disabled state and refuses to send.

mod smtp;

pub use smtp::SmtpMailer;

#[cfg(test)]
pub use recording::RecordingMailer;

use async_trait::async_trait;

use crate::core::error::Result;

/// Body flavour of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailBody {
    Html,
    Text,
}

/// A fully addressed message ready for the transport
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub from_name: Option<String>,
    pub from_email: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub kind: MailBody,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Whether messages can be delivered at all
    fn is_enabled(&self) -> bool;

    async fn send(&self, mail: OutgoingMail) -> Result<()>;
}

#[cfg(test)]
mod recording {
    use super::*;
    use crate::core::error::AppError;
    use std::sync::Mutex;

    /// Test double that keeps every message instead of sending it
    pub struct RecordingMailer {
        enabled: bool,
        fail: bool,
        sent: Mutex<Vec<OutgoingMail>>,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self {
                enabled: true,
                fail: false,
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn disabled() -> Self {
            Self {
                enabled: false,
                ..Self::new()
            }
        }

        /// Enabled, but every send fails like an unreachable relay
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        pub fn sent(&self) -> Vec<OutgoingMail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        fn is_enabled(&self) -> bool {
            self.enabled
        }

        async fn send(&self, mail: OutgoingMail) -> Result<()> {
            if !self.enabled {
                return Err(AppError::ServiceUnavailable("Mail is disabled".to_string()));
            }
            if self.fail {
                return Err(AppError::ExternalServiceError(
                    "connection refused".to_string(),
                ));
            }
            self.sent.lock().unwrap().push(mail);
            Ok(())
        }
    }
}
