// # Resolver Probe Trait
//
// Defines the interface for learning what the world currently sees when
// it resolves the target name through recursive DNS.
//
// ## Implementations
//
// - Native recursive resolver: `dnssync-resolver` crate (production)
// - Lookup-tool adapter parsing `nslookup` output: same crate
// - Deterministic fakes for tests
//
// ## Failure semantics
//
// This is a degraded, non-fatal read. NXDOMAIN, timeouts, and malformed
// resolver output all collapse to `None`; the Reconciler folds `None`
// into the comparison and still attempts convergence. Adapters log the
// underlying cause themselves.

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for resolver probe implementations
#[async_trait]
pub trait ResolverProbe: Send + Sync {
    /// Resolve the published A record for `fqdn`
    ///
    /// # Returns
    ///
    /// - `Some(Ipv4Addr)`: The address the recursive resolver returned
    /// - `None`: Unknown; resolution failed or the name does not exist
    async fn resolve_published(&self, fqdn: &str) -> Option<Ipv4Addr>;
}
