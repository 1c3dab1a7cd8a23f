// # SMTP Notifier
//
// This crate provides the change notifier for DNSSync. One message per
// committed change, submitted over STARTTLS.
//
// ## Failure semantics
//
// By the time the notifier runs, the reconciliation is already durably
// committed. Every failure here (missing configuration, unreadable
// credentials, transport errors) surfaces as a `NotifyError` that the
// Reconciler logs and otherwise ignores.
//
// Credentials are acquired through the narrow `CredentialSource` seam,
// so a future secret store can replace the key file without touching
// this transport code.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use dnssync_core::traits::{ChangeSummary, CredentialSource, Notifier, NotifyError};

/// SMTP submission settings
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// Submission server hostname
    pub server: String,
    /// Submission port (587 for STARTTLS submission)
    pub port: u16,
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
}

/// Change notifier sending one email per committed update
pub struct SmtpNotifier {
    settings: SmtpSettings,
    credentials: Box<dyn CredentialSource>,
}

impl SmtpNotifier {
    pub fn new(settings: SmtpSettings, credentials: Box<dyn CredentialSource>) -> Self {
        Self {
            settings,
            credentials,
        }
    }

    fn build_message(&self, summary: &ChangeSummary) -> Result<Message, NotifyError> {
        let from: Mailbox = self
            .settings
            .from
            .parse()
            .map_err(|e| NotifyError::Config(format!("invalid sender address: {e}")))?;
        let to: Mailbox = self
            .settings
            .to
            .parse()
            .map_err(|e| NotifyError::Config(format!("invalid recipient address: {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(format!("DNS record updated: {}", summary.fqdn))
            .body(body_text(summary))
            .map_err(|e| NotifyError::Transport(format!("failed to build message: {e}")))
    }
}

#[async_trait::async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_change(&self, summary: &ChangeSummary) -> Result<(), NotifyError> {
        if self.settings.server.trim().is_empty() {
            return Err(NotifyError::Config("no SMTP server configured".to_string()));
        }
        if self.settings.from.trim().is_empty() || self.settings.to.trim().is_empty() {
            return Err(NotifyError::Config(
                "sender or recipient address not configured".to_string(),
            ));
        }

        let credential = self
            .credentials
            .credential()
            .await
            .map_err(|e| NotifyError::Credentials(e.to_string()))?;

        let message = self.build_message(summary)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.server)
            .map_err(|e| NotifyError::Transport(format!("invalid SMTP relay: {e}")))?
            .port(self.settings.port)
            .credentials(Credentials::new(credential.username, credential.password))
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        tracing::debug!("notification sent to {}", self.settings.to);
        Ok(())
    }
}

/// Plain-text body describing the change
fn body_text(summary: &ChangeSummary) -> String {
    format!(
        "{} at {}\n",
        summary.describe(),
        summary.changed_at.format("%Y-%m-%d %H:%M:%S")
    )
}
