//! Error types for the reconciliation engine
//!
//! Each collaborator owns a small closed error enum (defined alongside
//! its trait) so the Reconciler can distinguish fatal-abort from
//! degraded-continue without inspecting message strings. This module
//! provides the umbrella type used at the crate boundary.

use thiserror::Error;

use crate::traits::audit::AuditError;
use crate::traits::credentials::CredentialError;
use crate::traits::gateway::GatewayError;
use crate::traits::notifier::NotifyError;
use crate::traits::observer::ObserveError;
use crate::traits::state_store::StateError;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Umbrella error type for the engine
#[derive(Error, Debug)]
pub enum Error {
    /// Public-address observation errors
    #[error("address observation error: {0}")]
    Observe(#[from] ObserveError),

    /// Provider gateway errors
    #[error("provider gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// State store errors
    #[error("state store error: {0}")]
    State(#[from] StateError),

    /// Audit log errors
    #[error("audit log error: {0}")]
    Audit(#[from] AuditError),

    /// Notification errors
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Credential acquisition errors
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors outside a specific collaborator
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
