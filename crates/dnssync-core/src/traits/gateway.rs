// # DNS Gateway Trait
//
// Defines the interface for reading and upserting the authoritative
// record set via a cloud DNS management API.
//
// ## Implementations
//
// - Azure DNS management REST API: `dnssync-gateway-azure` crate
// - Deterministic fakes for tests
//
// ## Failure semantics
//
// - `get_record` failures (and `Ok(None)` for a missing record set) feed
//   the comparison as an unknown provider value; they never abort a run.
// - `upsert_record` failures are reported to the caller; the Reconciler
//   leaves local state untouched so the next scheduled run retries from
//   the same pre-update position.
//
// Implementations perform single-shot API calls only. No retry logic,
// no caching, no background tasks; coordination is owned by the
// Reconciler and the external timer.

use async_trait::async_trait;
use std::net::Ipv4Addr;
use thiserror::Error;

/// A transient mirror of the provider's stored record set
///
/// The engine collapses multi-value record sets to single-value
/// semantics: only the first address is ever inspected or preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Time-to-live in seconds, if the provider reported one
    pub ttl: Option<u32>,
    /// Address values, in provider order
    pub addresses: Vec<Ipv4Addr>,
}

impl RecordSet {
    /// The first address value, the only one the engine considers
    pub fn first(&self) -> Option<Ipv4Addr> {
        self.addresses.first().copied()
    }
}

/// Result of a successful upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record set existed; a fresh single-value set was created
    Created,
    /// An existing record set was replaced
    Replaced {
        /// First address of the set that was replaced
        previous: Option<Ipv4Addr>,
    },
}

/// Errors from the provider gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Credential acquisition or authorization failure
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The management API answered with a non-success status
    #[error("provider API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Transport-level failure (connect, timeout, TLS)
    #[error("network error: {0}")]
    Network(String),

    /// The API response could not be interpreted
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Trait for DNS provider gateway implementations
#[async_trait]
pub trait DnsGateway: Send + Sync {
    /// Read the authoritative A record set for `name` in `zone`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(RecordSet))`: The record set as stored by the provider
    /// - `Ok(None)`: The record set does not exist
    /// - `Err(GatewayError)`: The read failed; treated as an unknown
    ///   provider value by the Reconciler
    async fn get_record(&self, zone: &str, name: &str)
    -> Result<Option<RecordSet>, GatewayError>;

    /// Create or replace the A record set for `name` in `zone`
    ///
    /// When no record set exists yet, implementations must construct a
    /// new one with the given TTL and single value rather than failing.
    ///
    /// # Idempotency
    ///
    /// Upserting the value already stored is safe and results in no
    /// semantic change at the provider.
    async fn upsert_record(
        &self,
        zone: &str,
        name: &str,
        ttl: u32,
        value: Ipv4Addr,
    ) -> Result<UpsertOutcome, GatewayError>;
}
