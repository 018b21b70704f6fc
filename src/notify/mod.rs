//! Notification channel for delivering quote documents.
//!
//! Only a simulated mailer exists: it validates the recipient, logs what
//! would have been sent and reports success. No network I/O is performed.

use chrono::Local;
use tracing::info;

use crate::domain::has_valid_email;
use crate::error::AppError;

/// Result of handing a document to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: String,
    pub subject: String,
    /// True when nothing actually left the machine.
    pub simulated: bool,
    pub message: String,
}

pub trait Notifier {
    fn send_quote(&self, recipient: &str, client_name: &str, document: &[u8]) -> Result<Delivery, AppError>;
}

#[derive(Debug, Clone)]
pub struct SimulatedMailer {
    sender: String,
}

impl SimulatedMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self { sender: sender.into() }
    }
}

impl Notifier for SimulatedMailer {
    fn send_quote(&self, recipient: &str, client_name: &str, document: &[u8]) -> Result<Delivery, AppError> {
        if !has_valid_email(recipient) {
            return Err(AppError::new(
                4,
                format!("'{recipient}' does not look like a valid email address; sending is disabled."),
            ));
        }

        let subject = format!("Preventivo Servizi Legali - {}", Local::now().format("%d/%m/%Y"));
        info!(
            from = %self.sender,
            to = %recipient,
            subject = %subject,
            client = %client_name,
            bytes = document.len(),
            "simulated email delivery"
        );

        Ok(Delivery {
            recipient: recipient.to_string(),
            subject,
            simulated: true,
            message: format!("Simulated delivery to {recipient} completed (development mode)."),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_delivery_succeeds_for_valid_address() {
        let mailer = SimulatedMailer::new("studio@example.com");
        let delivery = mailer.send_quote("cliente@example.it", "Mario Rossi", b"doc").unwrap();
        assert!(delivery.simulated);
        assert_eq!(delivery.recipient, "cliente@example.it");
        assert!(delivery.subject.starts_with("Preventivo Servizi Legali - "));
    }

    #[test]
    fn invalid_address_is_refused() {
        let mailer = SimulatedMailer::new("studio@example.com");
        let err = mailer.send_quote("cliente@", "Mario Rossi", b"doc").unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
