//! Test doubles and common utilities for reconciliation contract tests
//!
//! These fakes share their interior state across clones, so a test can
//! hand one clone to the Reconciler as a boxed trait object and keep
//! another for assertions.

#![allow(dead_code)]

use async_trait::async_trait;
use dnssync_core::config::RecordSpec;
use dnssync_core::traits::{
    AddressObserver, ChangeSummary, DnsGateway, GatewayError, Notifier, NotifyError, ObserveError,
    RecordSet, ResolverProbe, UpsertOutcome,
};
use dnssync_core::{MemoryAuditLog, MemoryStateStore, Reconciler};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An observer that returns a fixed address, or fails the observation
#[derive(Clone)]
pub struct FakeObserver {
    address: Option<Ipv4Addr>,
}

impl FakeObserver {
    pub fn returning(address: &str) -> Self {
        Self {
            address: Some(address.parse().unwrap()),
        }
    }

    pub fn failing() -> Self {
        Self { address: None }
    }
}

#[async_trait]
impl AddressObserver for FakeObserver {
    async fn observe(&self) -> Result<Ipv4Addr, ObserveError> {
        self.address
            .ok_or_else(|| ObserveError::Network("echo endpoint unreachable".to_string()))
    }
}

/// A resolver probe with a canned answer
#[derive(Clone)]
pub struct FakeResolver {
    answer: Option<Ipv4Addr>,
}

impl FakeResolver {
    pub fn answering(address: &str) -> Self {
        Self {
            answer: Some(address.parse().unwrap()),
        }
    }

    pub fn unknown() -> Self {
        Self { answer: None }
    }
}

#[async_trait]
impl ResolverProbe for FakeResolver {
    async fn resolve_published(&self, _fqdn: &str) -> Option<Ipv4Addr> {
        self.answer
    }
}

/// A recorded upsert invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertCall {
    pub zone: String,
    pub name: String,
    pub ttl: u32,
    pub value: Ipv4Addr,
}

/// A gateway over an in-memory record set that tracks calls
#[derive(Clone)]
pub struct FakeGateway {
    record: Arc<Mutex<Option<RecordSet>>>,
    fail_reads: bool,
    fail_upserts: bool,
    get_calls: Arc<AtomicUsize>,
    upsert_calls: Arc<AtomicUsize>,
    upserts: Arc<Mutex<Vec<UpsertCall>>>,
}

impl FakeGateway {
    pub fn storing(address: &str) -> Self {
        Self::with_record(Some(RecordSet {
            ttl: Some(300),
            addresses: vec![address.parse().unwrap()],
        }))
    }

    pub fn empty() -> Self {
        Self::with_record(None)
    }

    fn with_record(record: Option<RecordSet>) -> Self {
        Self {
            record: Arc::new(Mutex::new(record)),
            fail_reads: false,
            fail_upserts: false,
            get_calls: Arc::new(AtomicUsize::new(0)),
            upsert_calls: Arc::new(AtomicUsize::new(0)),
            upserts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn with_failing_upserts(mut self) -> Self {
        self.fail_upserts = true;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn upsert_call_count(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn upserts(&self) -> Vec<UpsertCall> {
        self.upserts.lock().unwrap().clone()
    }

    /// What the provider currently stores, as a fresh read would see it
    pub fn stored_first(&self) -> Option<Ipv4Addr> {
        self.record.lock().unwrap().as_ref().and_then(RecordSet::first)
    }
}

#[async_trait]
impl DnsGateway for FakeGateway {
    async fn get_record(
        &self,
        _zone: &str,
        _name: &str,
    ) -> Result<Option<RecordSet>, GatewayError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(GatewayError::Api {
                status: 500,
                message: "provider read unavailable".to_string(),
            });
        }
        Ok(self.record.lock().unwrap().clone())
    }

    async fn upsert_record(
        &self,
        zone: &str,
        name: &str,
        ttl: u32,
        value: Ipv4Addr,
    ) -> Result<UpsertOutcome, GatewayError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_upserts {
            return Err(GatewayError::Api {
                status: 500,
                message: "provider write unavailable".to_string(),
            });
        }

        self.upserts.lock().unwrap().push(UpsertCall {
            zone: zone.to_string(),
            name: name.to_string(),
            ttl,
            value,
        });

        let mut record = self.record.lock().unwrap();
        let previous = record.as_ref().and_then(RecordSet::first);
        let existed = record.is_some();
        *record = Some(RecordSet {
            ttl: Some(ttl),
            addresses: vec![value],
        });

        if existed {
            Ok(UpsertOutcome::Replaced { previous })
        } else {
            Ok(UpsertOutcome::Created)
        }
    }
}

/// A notifier that records every summary it is handed
#[derive(Clone)]
pub struct FakeNotifier {
    notifications: Arc<Mutex<Vec<ChangeSummary>>>,
    fail: bool,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self {
            notifications: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            notifications: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    pub fn notifications(&self) -> Vec<ChangeSummary> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify_change(&self, summary: &ChangeSummary) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Transport("smtp relay refused".to_string()));
        }
        self.notifications.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

/// The record every contract test reconciles
pub fn test_record() -> RecordSpec {
    RecordSpec {
        zone: "example.com".to_string(),
        name: "home".to_string(),
        ttl: 300,
    }
}

/// Wire a Reconciler from fakes, handing clones to the engine so the
/// originals stay available for assertions
pub fn reconciler(
    observer: &FakeObserver,
    resolver: &FakeResolver,
    gateway: &FakeGateway,
    state: &MemoryStateStore,
    audit: &MemoryAuditLog,
    notifier: &FakeNotifier,
) -> Reconciler {
    Reconciler::new(
        test_record(),
        Box::new(observer.clone()),
        Box::new(resolver.clone()),
        Box::new(gateway.clone()),
        Box::new(state.clone()),
        Box::new(audit.clone()),
        Box::new(notifier.clone()),
    )
}
