// # Memory State Store
//
// In-memory implementation of StateStore.
//
// Nothing survives the process; useful for tests and for embedders that
// accept one redundant provider write after a restart.

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::traits::state_store::{StateError, StateStore};

/// In-memory last-applied-address store
///
/// Cloning shares the underlying value, which lets tests keep a handle
/// for assertions while the Reconciler owns the boxed trait object.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Option<Ipv4Addr>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a last-applied address
    pub fn with_last(ip: Ipv4Addr) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(ip))),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn read_last(&self) -> Result<Option<Ipv4Addr>, StateError> {
        Ok(*self.inner.read().await)
    }

    async fn write_last(&self, ip: Ipv4Addr) -> Result<(), StateError> {
        *self.inner.write().await = Some(ip);
        Ok(())
    }
}
