// # Audit Log Trait
//
// Defines the interface for the durable decision log. Every branch the
// Reconciler takes, including no-ops and failures, produces exactly one
// entry, so the log is the complete user-visible history of the engine.
//
// ## Implementations
//
// - File-based with a rolling retention window
// - In-memory capture for tests

use async_trait::async_trait;
use thiserror::Error;

/// Errors from audit log persistence
#[derive(Debug, Error)]
pub enum AuditError {
    /// Filesystem failure reading or rewriting the log
    #[error("audit log I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for audit log implementations
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one entry recording a decision or outcome
    ///
    /// Implementations stamp the entry themselves; callers pass only the
    /// human-readable message.
    async fn append(&self, message: &str) -> Result<(), AuditError>;
}
