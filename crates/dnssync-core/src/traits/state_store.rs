// # State Store Trait
//
// Defines the interface for persisting the last successfully applied
// address across invocations.
//
// ## Purpose
//
// The stored value distinguishes "provider already correct but the
// published record is stale" from "address actually changed" when the
// Reconciler logs its decision. It is written only after a confirmed
// successful provider update, so a failed upsert leaves the next run
// in exactly the same pre-update position.
//
// ## Implementations
//
// - File-based: single-line file, overwrite semantics
// - In-memory: tests and embedders that don't need persistence

use async_trait::async_trait;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Errors from state persistence
#[derive(Debug, Error)]
pub enum StateError {
    /// Filesystem failure reading or writing the state file
    #[error("state store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for last-applied-address store implementations
///
/// Implementations must be thread-safe and usable across async tasks.
/// The resource is opened and released per access; no long-held locks.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the last successfully applied address
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Ipv4Addr))`: The last address this engine wrote
    /// - `Ok(None)`: No update has ever been recorded
    /// - `Err(StateError)`: Storage error
    async fn read_last(&self) -> Result<Option<Ipv4Addr>, StateError>;

    /// Record `ip` as the last successfully applied address
    ///
    /// Overwrites any previous value. Called only after the provider
    /// confirmed a successful upsert.
    async fn write_last(&self, ip: Ipv4Addr) -> Result<(), StateError>;
}
