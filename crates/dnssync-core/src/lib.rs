// # dnssync-core
//
// Core library for the DNSSync dynamic-DNS reconciliation engine.
//
// ## Architecture Overview
//
// One invocation of the engine performs a single reconciliation pass:
// observe the caller's public address, probe what the world and the
// authoritative provider currently publish, and converge the provider's
// A record toward the observed truth if they disagree.
//
// - **AddressObserver**: Trait for learning the current public address
// - **ResolverProbe**: Trait for recursively resolving the published record
// - **DnsGateway**: Trait for reading/upserting the authoritative record set
// - **StateStore**: Trait for persisting the last successfully applied address
// - **AuditLog**: Trait for the time-windowed durable decision log
// - **Notifier**: Trait for announcing committed changes
// - **Reconciler**: Orchestrates one compare-then-converge pass
//
// ## Design Principles
//
// 1. **Run-to-completion**: No internal scheduler; the caller's timer
//    drives invocations, the engine always terminates.
// 2. **Separation of Concerns**: Decision logic is separate from adapters.
// 3. **Idempotency**: A converged system performs zero mutating calls.
// 4. **Fail-open reads**: Degraded observations never abort convergence.
// 5. **Library-First**: The binary is a thin wiring layer over this crate.

pub mod audit;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{Config, RecordSpec, ResolverMode};
pub use error::{Error, Result};
pub use reconcile::{Observation, Outcome, Reconciler};
pub use state::{FileStateStore, MemoryStateStore};
pub use audit::{FileAuditLog, MemoryAuditLog};
pub use traits::{
    AddressObserver, AuditLog, CredentialSource, DnsGateway, Notifier, ResolverProbe, StateStore,
};
