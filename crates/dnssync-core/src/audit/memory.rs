// # Memory Audit Log
//
// In-memory capture of audit messages, for tests and embedders that
// surface the trail through their own channels.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::traits::audit::{AuditError, AuditLog};

/// In-memory audit log
///
/// Cloning shares the captured entries, which lets tests keep a handle
/// for assertions while the Reconciler owns the boxed trait object.
/// Entries hold the raw messages without timestamp prefixes.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    entries: Arc<RwLock<Vec<String>>>,
}

impl MemoryAuditLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured messages, in append order
    pub async fn entries(&self) -> Vec<String> {
        self.entries.read().await.clone()
    }

    /// Number of messages matching a substring
    pub async fn count_containing(&self, needle: &str) -> usize {
        self.entries
            .read()
            .await
            .iter()
            .filter(|entry| entry.contains(needle))
            .count()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn append(&self, message: &str) -> Result<(), AuditError> {
        tracing::info!("{message}");
        self.entries.write().await.push(message.to_string());
        Ok(())
    }
}
