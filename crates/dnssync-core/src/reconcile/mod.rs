//! The reconciliation engine
//!
//! The Reconciler compares three observations of the same record (the
//! caller's public address, what recursive DNS currently publishes, and
//! what the authoritative provider stores) and converges the provider
//! toward the observed truth when they disagree.
//!
//! ## Control flow
//!
//! ```text
//! ┌──────────────────┐
//! │ AddressObserver  │── public address (fatal on failure) ──┐
//! └──────────────────┘                                       │
//! ┌──────────────────┐                                       ▼
//! │ ResolverProbe    │── published value ──────────► ┌──────────────┐
//! └──────────────────┘                               │  Reconciler  │
//! ┌──────────────────┐                               └──────────────┘
//! │ DnsGateway (get) │── provider value ─────────────────────▲
//! └──────────────────┘                                       │
//!                    no-op ◄── compare ──► upsert ── commit ─┘
//!                                             │
//!                           StateStore ◄──────┴──────► Notifier
//! ```
//!
//! Every branch, including the no-op and every failure kind, produces
//! exactly one audit log entry describing the outcome.
//!
//! ## Per-run state machine
//!
//! Idle → Observing → Comparing → {NoOpDone | Updating → {Committed |
//! WriteFailed}}. All states are terminal for the process; the only
//! cross-run state is the last-applied address and the audit trail.

use chrono::{DateTime, Local};
use std::net::Ipv4Addr;

use crate::config::RecordSpec;
use crate::error::Result;
use crate::traits::{
    AddressObserver, AuditLog, ChangeSummary, DnsGateway, Notifier, ResolverProbe, StateStore,
};

/// One run's view of the world
///
/// Created fresh each invocation and discarded at run end. `None`
/// values represent a failed or degraded read, never an
/// absence-of-record signal; an empty provider record set also reads
/// as `None` because only the first value carries meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// The caller's current network-visible address
    pub public: Ipv4Addr,
    /// What recursive DNS currently answers for the record
    pub published: Option<Ipv4Addr>,
    /// What the authoritative provider currently stores
    pub provider: Option<Ipv4Addr>,
    /// When the observation was assembled
    pub observed_at: DateTime<Local>,
}

/// Outcome of one reconciliation pass
///
/// All variants are normal completions of the process; the caller maps
/// them to logging and exit behavior, not to process failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// All three observations agree; no mutating call was made
    InSync {
        /// The agreed address
        address: Ipv4Addr,
    },
    /// The provider was updated and local state advanced
    Committed {
        /// Provider value before the update, if known
        previous: Option<Ipv4Addr>,
        /// Value now stored at the provider
        address: Ipv4Addr,
    },
    /// The provider upsert failed; no state was touched
    WriteFailed {
        /// The value the engine attempted to write
        address: Ipv4Addr,
    },
    /// The public address could not be observed; nothing was attempted
    Aborted,
}

/// Why an update proceeds, for logging detail only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateReason {
    /// Provider already correct but the published record is stale or
    /// unknown
    StalePublished,
    /// Address changed or observations are otherwise out of sync
    OutOfSync,
}

/// The pure comparison at the heart of the engine
///
/// An update is skipped only when both the published and provider
/// values are known and equal to the public address. Any unknown
/// observation fails open into an update attempt.
fn decide(observation: &Observation, last_applied: Option<Ipv4Addr>) -> Option<UpdateReason> {
    let public = Some(observation.public);
    if observation.published == public && observation.provider == public {
        return None;
    }

    if last_applied == Some(observation.public) && observation.provider == public {
        Some(UpdateReason::StalePublished)
    } else {
        Some(UpdateReason::OutOfSync)
    }
}

/// The reconciliation engine
///
/// Holds its collaborators as injected trait objects so tests can
/// substitute deterministic fakes. One [`Reconciler::run`] call performs
/// one complete pass and terminates; there is no internal scheduler and
/// no cross-run state beyond what the [`StateStore`] and [`AuditLog`]
/// persist.
pub struct Reconciler {
    record: RecordSpec,
    observer: Box<dyn AddressObserver>,
    resolver: Box<dyn ResolverProbe>,
    gateway: Box<dyn DnsGateway>,
    state: Box<dyn StateStore>,
    audit: Box<dyn AuditLog>,
    notifier: Box<dyn Notifier>,
}

impl Reconciler {
    /// Create a new reconciliation engine
    ///
    /// # Parameters
    ///
    /// - `record`: The record to keep in sync
    /// - `observer`: Public-address observer
    /// - `resolver`: Recursive resolver probe
    /// - `gateway`: Authoritative provider gateway
    /// - `state`: Last-applied-address store
    /// - `audit`: Durable decision log
    /// - `notifier`: Change notifier
    pub fn new(
        record: RecordSpec,
        observer: Box<dyn AddressObserver>,
        resolver: Box<dyn ResolverProbe>,
        gateway: Box<dyn DnsGateway>,
        state: Box<dyn StateStore>,
        audit: Box<dyn AuditLog>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            record,
            observer,
            resolver,
            gateway,
            state,
            audit,
            notifier,
        }
    }

    /// Perform one reconciliation pass
    ///
    /// Returns `Err` only for audit-log I/O failures; every modeled
    /// failure kind (observation, degraded reads, provider write,
    /// notification) is converted into an [`Outcome`] and recorded in
    /// the audit log.
    pub async fn run(&self) -> Result<Outcome> {
        // Observe. Failure here is fatal for the run: without a trusted
        // public address there is nothing safe to converge toward.
        let public = match self.observer.observe().await {
            Ok(ip) => ip,
            Err(e) => {
                self.audit
                    .append(&format!("Could not retrieve public address: {e}"))
                    .await?;
                return Ok(Outcome::Aborted);
            }
        };

        let fqdn = self.record.fqdn();

        // Probe what the world sees. Degraded read, never fatal.
        let published = self.resolver.resolve_published(&fqdn).await;
        match published {
            Some(ip) => {
                self.audit
                    .append(&format!("Published record for {fqdn} resolves to {ip}"))
                    .await?;
            }
            None => {
                self.audit
                    .append(&format!("Could not resolve published record for {fqdn}"))
                    .await?;
            }
        }

        // Read what the provider stores. Degraded read, never fatal.
        let provider = match self
            .gateway
            .get_record(&self.record.zone, &self.record.name)
            .await
        {
            Ok(Some(set)) => match set.first() {
                Some(ip) => {
                    self.audit
                        .append(&format!("Provider record for {fqdn} is set to {ip}"))
                        .await?;
                    Some(ip)
                }
                None => {
                    self.audit
                        .append(&format!("Provider record for {fqdn} is not set"))
                        .await?;
                    None
                }
            },
            Ok(None) => {
                self.audit
                    .append(&format!("Provider record for {fqdn} is not set"))
                    .await?;
                None
            }
            Err(e) => {
                self.audit
                    .append(&format!("Could not read provider record for {fqdn}: {e}"))
                    .await?;
                None
            }
        };

        let observation = Observation {
            public,
            published,
            provider,
            observed_at: Local::now(),
        };

        // A degraded state-store read must not stop convergence; the
        // stored value only refines the log message.
        let last_applied = match self.state.read_last().await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("failed to read last applied address: {e}");
                None
            }
        };

        let reason = match decide(&observation, last_applied) {
            None => {
                self.audit
                    .append(&format!(
                        "Public address, published record, and provider record already in sync ({public}). Nothing to do."
                    ))
                    .await?;
                return Ok(Outcome::InSync { address: public });
            }
            Some(reason) => reason,
        };

        match reason {
            UpdateReason::StalePublished => {
                self.audit
                    .append(&format!(
                        "Address {public} unchanged since last run and provider already matches, but published record does not. Updating provider record anyway."
                    ))
                    .await?;
            }
            UpdateReason::OutOfSync => {
                self.audit
                    .append("Address changed or records out of sync. Updating provider record.")
                    .await?;
            }
        }

        match self
            .gateway
            .upsert_record(&self.record.zone, &self.record.name, self.record.ttl, public)
            .await
        {
            Ok(_) => {
                // Advance local state only after the provider confirmed
                // the write. A failure here leaves the provider correct;
                // the next run will simply re-derive the same no-op.
                if let Err(e) = self.state.write_last(public).await {
                    tracing::warn!("failed to record last applied address: {e}");
                    self.audit
                        .append(&format!(
                            "Provider updated but recording the applied address failed: {e}"
                        ))
                        .await?;
                }

                let summary = ChangeSummary {
                    fqdn: fqdn.clone(),
                    previous: observation.provider,
                    current: public,
                    changed_at: observation.observed_at,
                };
                self.audit.append(&summary.describe()).await?;

                // Notification failure is isolated: the reconciliation
                // is already durably committed.
                match self.notifier.notify_change(&summary).await {
                    Ok(()) => {
                        self.audit.append("Change notification sent").await?;
                    }
                    Err(e) => {
                        self.audit
                            .append(&format!("Failed to send change notification: {e}"))
                            .await?;
                    }
                }

                Ok(Outcome::Committed {
                    previous: observation.provider,
                    address: public,
                })
            }
            Err(e) => {
                self.audit
                    .append(&format!("Failed to update {fqdn} to {public}: {e}"))
                    .await?;
                Ok(Outcome::WriteFailed { address: public })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(
        public: &str,
        published: Option<&str>,
        provider: Option<&str>,
    ) -> Observation {
        Observation {
            public: public.parse().unwrap(),
            published: published.map(|ip| ip.parse().unwrap()),
            provider: provider.map(|ip| ip.parse().unwrap()),
            observed_at: Local::now(),
        }
    }

    #[test]
    fn converged_observations_decide_no_op() {
        let obs = observation("5.6.7.8", Some("5.6.7.8"), Some("5.6.7.8"));
        assert_eq!(decide(&obs, Some("5.6.7.8".parse().unwrap())), None);
        assert_eq!(decide(&obs, None), None);
    }

    #[test]
    fn changed_address_decides_update() {
        let obs = observation("1.2.3.4", Some("1.2.3.3"), Some("1.2.3.3"));
        assert_eq!(
            decide(&obs, Some("1.2.3.3".parse().unwrap())),
            Some(UpdateReason::OutOfSync)
        );
    }

    #[test]
    fn stale_published_record_is_distinguished_in_reason() {
        // Provider and last-applied already carry the public address;
        // only the published record lags.
        let obs = observation("1.2.3.4", Some("1.2.3.3"), Some("1.2.3.4"));
        assert_eq!(
            decide(&obs, Some("1.2.3.4".parse().unwrap())),
            Some(UpdateReason::StalePublished)
        );
    }

    #[test]
    fn unknown_provider_value_fails_open_into_update() {
        // Public and published agree, but the provider read failed:
        // unknown cannot equal the public address.
        let obs = observation("9.9.9.9", Some("9.9.9.9"), None);
        assert_eq!(
            decide(&obs, Some("9.9.9.9".parse().unwrap())),
            Some(UpdateReason::OutOfSync)
        );
    }

    #[test]
    fn unknown_published_value_fails_open_into_update() {
        let obs = observation("9.9.9.9", None, Some("9.9.9.9"));
        assert_eq!(
            decide(&obs, Some("9.9.9.9".parse().unwrap())),
            Some(UpdateReason::StalePublished)
        );
        assert_eq!(decide(&obs, None), Some(UpdateReason::OutOfSync));
    }
}
