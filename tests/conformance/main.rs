//! The bundled backends against the conformance suite, and the suite against broken backends.

mod support;

use std::sync::Arc;

use store_contract::testsuite::{Harness, Scenario, SuiteFactory, Tier, NAMESPACE};
use store_contract::{
    FileStore, InMemoryStore, ListOpt, ManualClock, Store, StoreConfig, SystemClock,
};
use support::{init_tracing, IgnoresFilter, Upserting};

fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(1_700_000_000))
}

#[test]
fn in_memory_store_passes_advanced_tier() {
    init_tracing();
    let clock = manual_clock();
    let store = InMemoryStore::with_clock(clock.clone());

    let report = Harness::new(store.clone(), clock).assert_tier(Tier::Advanced);
    assert_eq!(report.passed, Tier::Advanced.scenarios());
    assert!(store.is_closed());
}

#[test]
fn file_store_passes_advanced_tier() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let clock = manual_clock();
    let store = FileStore::open_with_clock(dir.path().join("suite.json"), clock.clone()).unwrap();

    Harness::new(store, clock).assert_tier(Tier::Advanced);
}

#[test]
fn file_store_keeps_suite_data_after_close() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("suite.json");
    let clock = manual_clock();
    let store = FileStore::open_with_clock(&path, clock.clone()).unwrap();
    Harness::new(store, clock).assert_tier(Tier::Basic);

    let reopened = FileStore::open(&path).unwrap();
    let listing = reopened
        .list(&SuiteFactory::new(NAMESPACE), &ListOpt::new(0, 10))
        .unwrap();
    assert_eq!(listing.total, 5);
}

#[test]
fn configured_store_passes_basic_tier() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let clock = manual_clock();
    let config = StoreConfig::File {
        path: dir.path().join("configured.json"),
    };
    let store = config.open_with_clock(clock.clone()).unwrap();

    Harness::new(store, clock).assert_tier(Tier::Basic);
}

// Real one-second gaps between ordered writes, roughly fifteen seconds in total.
#[test]
fn in_memory_store_passes_advanced_tier_on_wall_clock() {
    init_tracing();
    let clock = Arc::new(SystemClock);
    let store = InMemoryStore::with_clock(clock.clone());

    Harness::new(store, clock).assert_tier(Tier::Advanced);
}

#[test]
fn store_ignoring_filters_fails_filter_scenario() {
    init_tracing();
    let clock = manual_clock();
    let store = IgnoresFilter(InMemoryStore::with_clock(clock.clone()));

    let failure = Harness::new(store, clock).run(Tier::Advanced).unwrap_err();
    assert_eq!(failure.scenario, Scenario::Filter);
    assert!(failure.passed.contains(&Scenario::UpdatedDesc));
    assert!(!failure.passed.contains(&Scenario::UntrackedSort));
    assert!(failure.reason.contains("expected exactly 1"));
}

#[test]
fn upserting_store_fails_duplicate_scenario() {
    init_tracing();
    let clock = manual_clock();
    let store = Upserting(InMemoryStore::with_clock(clock.clone()));

    let failure = Harness::new(store, clock).run(Tier::Basic).unwrap_err();
    assert_eq!(failure.scenario, Scenario::DuplicateCreate);
    assert_eq!(failure.passed, vec![Scenario::NilStorage, Scenario::CrudRoundTrip]);
    assert_eq!(failure.reason, "second create of the same key succeeded");
}
