//! Backend-agnostic key-value store contract.
//!
//! Items are addressed by `(namespace, id)` and may opt into extra behavior
//! (serialization, timestamps, id assignment) that stores discover at runtime.
//! [`Store::list`] pages, sorts and filters one namespace the same way on every
//! backend, and the [`testsuite`] module checks that a backend really does.

mod backend;
mod clock;
mod config;
mod item;
mod query;
mod store;

#[cfg(feature = "testsuite")]
pub mod testsuite;

pub use backend::{FileStore, InMemoryStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AnyStore, ConfigError, StoreConfig};
pub use item::{
    CodecError, Encoding, Factory, IdSetter, Item, Serializable, SerializedItem, TimeTracker,
};
pub use query::{select, Filter, ListOpt, Listing, Row, Sort, DEFAULT_LIMIT};
pub use store::{Store, StoreError, StoreResult};
