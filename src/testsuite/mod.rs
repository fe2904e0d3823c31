//! Conformance suite for [`Store`] implementations.
//!
//! Runs a fixed, ordered battery of scenarios against one live store and stops
//! at the first failure. Point it at a fresh, empty store: scenarios assert
//! exact counts per namespace and the run ends by closing the store.
//!
//! ```ignore
//! use std::sync::Arc;
//! use store_contract::testsuite::{Harness, Tier};
//! use store_contract::{InMemoryStore, ManualClock};
//!
//! #[test]
//! fn in_memory_store_conforms() {
//!     let clock = Arc::new(ManualClock::new(1_700_000_000));
//!     let store = InMemoryStore::with_clock(clock.clone());
//!     Harness::new(store, clock).assert_tier(Tier::Advanced);
//! }
//! ```
//!
//! Timestamps have one-second resolution, so the ordering scenarios call
//! [`Clock::tick`] between writes. Share the store's clock with the harness: a
//! [`ManualClock`](crate::ManualClock) makes those ticks free, the
//! [`SystemClock`](crate::SystemClock) really sleeps.

mod fixtures;
mod scenarios;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::clock::Clock;
use crate::store::Store;

pub use fixtures::{SuiteFactory, SuiteItem, UntimedItem, FIXED_ID, NAMESPACE, OTHER_NAMESPACE};

/// Every scenario the suite knows, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    NilStorage,
    CrudRoundTrip,
    DuplicateCreate,
    MissingKey,
    AssignedId,
    NaturalList,
    CreatedAsc,
    CreatedDesc,
    UpdatedAsc,
    UpdatedDesc,
    Filter,
    UntrackedSort,
    CloseTwice,
}

impl Scenario {
    pub fn name(self) -> &'static str {
        match self {
            Scenario::NilStorage => "nil_storage",
            Scenario::CrudRoundTrip => "crud_round_trip",
            Scenario::DuplicateCreate => "duplicate_create",
            Scenario::MissingKey => "missing_key",
            Scenario::AssignedId => "assigned_id",
            Scenario::NaturalList => "natural_list",
            Scenario::CreatedAsc => "sort_created_asc",
            Scenario::CreatedDesc => "sort_created_desc",
            Scenario::UpdatedAsc => "sort_updated_asc",
            Scenario::UpdatedDesc => "sort_updated_desc",
            Scenario::Filter => "filter",
            Scenario::UntrackedSort => "untracked_sort",
            Scenario::CloseTwice => "close_twice",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How much of the contract to exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Nil guard, CRUD, key errors, id assignment and natural-order listing.
    Basic,
    /// Basic plus the timestamp sorts and filtering.
    Advanced,
}

impl Tier {
    pub fn scenarios(self) -> Vec<Scenario> {
        let mut scenarios = vec![
            Scenario::NilStorage,
            Scenario::CrudRoundTrip,
            Scenario::DuplicateCreate,
            Scenario::MissingKey,
            Scenario::AssignedId,
            Scenario::NaturalList,
        ];
        if self == Tier::Advanced {
            scenarios.extend([
                Scenario::CreatedAsc,
                Scenario::CreatedDesc,
                Scenario::UpdatedAsc,
                Scenario::UpdatedDesc,
                Scenario::Filter,
                Scenario::UntrackedSort,
            ]);
        }
        scenarios.push(Scenario::CloseTwice);
        scenarios
    }
}

/// The first scenario that failed and why.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scenario {scenario} failed: {reason}")]
pub struct ScenarioFailure {
    pub scenario: Scenario,
    pub reason: String,
    /// Scenarios that passed before the failure.
    pub passed: Vec<Scenario>,
}

/// A clean run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub passed: Vec<Scenario>,
}

/// Drives one store through the scenario battery, strictly in sequence.
pub struct Harness<S> {
    store: Option<S>,
    clock: Arc<dyn Clock>,
}

impl<S: Store> Harness<S> {
    /// `clock` must be the clock `store` stamps items with.
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self::from_option(Some(store), clock)
    }

    /// A harness that may have no store. Every run then fails its nil guard.
    pub fn from_option(store: Option<S>, clock: Arc<dyn Clock>) -> Self {
        Harness { store, clock }
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }

    pub fn run(&self, tier: Tier) -> Result<Report, ScenarioFailure> {
        self.run_scenarios(&tier.scenarios())
    }

    /// Runs `scenarios` in order, aborting at the first failure.
    pub fn run_scenarios(&self, scenarios: &[Scenario]) -> Result<Report, ScenarioFailure> {
        let mut passed = Vec::with_capacity(scenarios.len());
        for &scenario in scenarios {
            match self.run_one(scenario) {
                Ok(()) => {
                    info!(%scenario, "scenario passed");
                    passed.push(scenario);
                }
                Err(reason) => {
                    error!(%scenario, %reason, "scenario failed, aborting run");
                    return Err(ScenarioFailure {
                        scenario,
                        reason,
                        passed,
                    });
                }
            }
        }
        Ok(Report { passed })
    }

    /// Panics with the failing scenario and reason. For use inside `#[test]`.
    pub fn assert_tier(&self, tier: Tier) -> Report {
        match self.run(tier) {
            Ok(report) => report,
            Err(failure) => panic!("{failure}"),
        }
    }

    /// Without a store every scenario fails the nil guard.
    fn run_one(&self, scenario: Scenario) -> scenarios::Outcome {
        let Some(store) = self.store.as_ref() else {
            return scenarios::nil_storage::<S>(None);
        };
        let clock = self.clock.as_ref();
        match scenario {
            Scenario::NilStorage => scenarios::nil_storage(Some(store)),
            Scenario::CrudRoundTrip => scenarios::crud_round_trip(store, clock),
            Scenario::DuplicateCreate => scenarios::duplicate_create(store, clock),
            Scenario::MissingKey => scenarios::missing_key(store, clock),
            Scenario::AssignedId => scenarios::assigned_id(store, clock),
            Scenario::NaturalList => scenarios::natural_list(store, clock),
            Scenario::CreatedAsc => scenarios::created_asc(store, clock),
            Scenario::CreatedDesc => scenarios::created_desc(store, clock),
            Scenario::UpdatedAsc => scenarios::updated_asc(store, clock),
            Scenario::UpdatedDesc => scenarios::updated_desc(store, clock),
            Scenario::Filter => scenarios::filter(store, clock),
            Scenario::UntrackedSort => scenarios::untracked_sort(store, clock),
            Scenario::CloseTwice => scenarios::close_twice(store, clock),
        }
    }
}
