//! Core traits for the reconciliation engine
//!
//! This module defines the abstract interfaces every collaborator
//! implements, so the Reconciler can be exercised with deterministic
//! fakes in tests and with real network adapters in production.
//!
//! - [`AddressObserver`]: Learn the caller's current public address
//! - [`ResolverProbe`]: Recursively resolve the published record
//! - [`DnsGateway`]: Read/upsert the authoritative record set
//! - [`StateStore`]: Persist the last successfully applied address
//! - [`AuditLog`]: Durable, time-windowed decision log
//! - [`Notifier`]: Announce committed changes
//! - [`CredentialSource`]: Narrow secret-acquisition seam

pub mod audit;
pub mod credentials;
pub mod gateway;
pub mod notifier;
pub mod observer;
pub mod resolver;
pub mod state_store;

pub use audit::{AuditError, AuditLog};
pub use credentials::{Credential, CredentialError, CredentialSource, KeyFileCredentials};
pub use gateway::{DnsGateway, GatewayError, RecordSet, UpsertOutcome};
pub use notifier::{ChangeSummary, Notifier, NotifyError};
pub use observer::{AddressObserver, ObserveError};
pub use resolver::ResolverProbe;
pub use state_store::{StateError, StateStore};
