// # Address Observer Trait
//
// Defines the interface for learning the caller's current
// network-visible (public) IPv4 address.
//
// ## Implementations
//
// - HTTP echo service: `dnssync-observer-http` crate
// - Deterministic fakes for tests
//
// ## Failure semantics
//
// Observation failure is fatal for the reconciliation run. Without a
// trusted public address there is nothing safe to converge toward, so
// the Reconciler aborts before any state mutation. This is the only
// collaborator whose failure is not downgraded to a degraded read.

use async_trait::async_trait;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Errors from a public-address observation attempt
#[derive(Debug, Error)]
pub enum ObserveError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("request failed: {0}")]
    Network(String),

    /// The echo endpoint answered with a non-success status
    #[error("unexpected status {0} from address echo endpoint")]
    Status(u16),

    /// The response body did not contain a parseable IPv4 address
    #[error("malformed echo response: {0:?}")]
    Malformed(String),
}

/// Trait for public-address observer implementations
///
/// Implementations must be thread-safe and usable across async tasks.
/// One bounded-timeout request per call; no caching, no retries (the
/// external timer that drives invocations is the retry mechanism).
#[async_trait]
pub trait AddressObserver: Send + Sync {
    /// Observe the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The caller's network-visible address
    /// - `Err(ObserveError)`: Fatal for the run; the Reconciler aborts
    ///   cleanly without mutating any state
    async fn observe(&self) -> Result<Ipv4Addr, ObserveError>;
}
