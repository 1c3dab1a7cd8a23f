//! Contract test: idempotence
//!
//! A converged system performs zero mutating calls. When the public
//! address, the published record, and the provider record all agree,
//! a pass must not touch the gateway's write path, the state store, or
//! the notifier, and must log exactly one "already in sync" entry.

mod common;

use common::*;
use dnssync_core::traits::StateStore;
use dnssync_core::{MemoryAuditLog, MemoryStateStore, Outcome};

#[tokio::test]
async fn converged_system_is_a_no_op() {
    let observer = FakeObserver::returning("5.6.7.8");
    let resolver = FakeResolver::answering("5.6.7.8");
    let gateway = FakeGateway::storing("5.6.7.8");
    let state = MemoryStateStore::with_last("5.6.7.8".parse().unwrap());
    let audit = MemoryAuditLog::new();
    let notifier = FakeNotifier::new();

    let engine = reconciler(&observer, &resolver, &gateway, &state, &audit, &notifier);
    let outcome = engine.run().await.unwrap();

    assert_eq!(
        outcome,
        Outcome::InSync {
            address: "5.6.7.8".parse().unwrap()
        }
    );

    // Zero mutating calls.
    assert_eq!(gateway.upsert_call_count(), 0);
    assert!(notifier.notifications().is_empty());
    assert_eq!(
        state.read_last().await.unwrap(),
        Some("5.6.7.8".parse().unwrap())
    );

    // Exactly one "already in sync" entry.
    assert_eq!(audit.count_containing("already in sync").await, 1);
}

#[tokio::test]
async fn repeated_runs_stay_no_ops() {
    let observer = FakeObserver::returning("5.6.7.8");
    let resolver = FakeResolver::answering("5.6.7.8");
    let gateway = FakeGateway::storing("5.6.7.8");
    let state = MemoryStateStore::new();
    let audit = MemoryAuditLog::new();
    let notifier = FakeNotifier::new();

    let engine = reconciler(&observer, &resolver, &gateway, &state, &audit, &notifier);
    for _ in 0..3 {
        let outcome = engine.run().await.unwrap();
        assert!(matches!(outcome, Outcome::InSync { .. }));
    }

    assert_eq!(gateway.upsert_call_count(), 0);
    // A missing last-applied value does not force an update when the
    // world already agrees; the state file stays untouched.
    assert_eq!(state.read_last().await.unwrap(), None);
}
