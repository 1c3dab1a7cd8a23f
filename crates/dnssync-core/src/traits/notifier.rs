// # Notifier Trait
//
// Defines the interface for announcing a committed change. Invoked on
// successful provider updates only; never on no-ops or failures.
//
// ## Failure semantics
//
// Notification failure is an isolated side-channel failure. By the time
// the Notifier runs, the reconciliation is already durably committed, so
// an error here is logged and otherwise ignored.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::net::Ipv4Addr;
use thiserror::Error;

/// What changed, for the notification message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSummary {
    /// Fully-qualified name of the record that was updated
    pub fqdn: String,
    /// Provider value before the update, if it was known
    pub previous: Option<Ipv4Addr>,
    /// Value the record now carries
    pub current: Ipv4Addr,
    /// When the change was committed
    pub changed_at: DateTime<Local>,
}

impl ChangeSummary {
    /// One-line description used for subjects and log entries
    pub fn describe(&self) -> String {
        format!(
            "{} updated from {} to {}",
            self.fqdn,
            self.previous
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| "(none)".to_string()),
            self.current
        )
    }
}

/// Errors from change notification
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Notification is not configured (missing server or addresses)
    #[error("notifier not configured: {0}")]
    Config(String),

    /// Credentials could not be acquired
    #[error("notifier credentials unavailable: {0}")]
    Credentials(String),

    /// The transport rejected the message
    #[error("failed to send notification: {0}")]
    Transport(String),
}

/// Trait for change notifier implementations
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a notification describing a committed change
    async fn notify_change(&self, summary: &ChangeSummary) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_includes_both_values() {
        let summary = ChangeSummary {
            fqdn: "home.example.com".to_string(),
            previous: Some("1.2.3.3".parse().unwrap()),
            current: "1.2.3.4".parse().unwrap(),
            changed_at: Local::now(),
        };
        let text = summary.describe();
        assert!(text.contains("home.example.com"));
        assert!(text.contains("1.2.3.3"));
        assert!(text.contains("1.2.3.4"));
    }

    #[test]
    fn describe_marks_unknown_previous_value() {
        let summary = ChangeSummary {
            fqdn: "home.example.com".to_string(),
            previous: None,
            current: "1.2.3.4".parse().unwrap(),
            changed_at: Local::now(),
        };
        assert!(summary.describe().contains("(none)"));
    }
}
