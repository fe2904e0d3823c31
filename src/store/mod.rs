//! Store - the contract every backend implements.
//!
//! Five synchronous operations plus `close`. Create, read and update borrow the
//! caller's item for the duration of the call: read decodes into it in place,
//! create and update may write an assigned id or fresh timestamps back into it.
//! Nothing is retained once the call returns.

mod error;
mod table;

use std::sync::Arc;

use crate::item::{Factory, Item};
use crate::query::{ListOpt, Listing};

pub use error::{StoreError, StoreResult};
pub(crate) use table::{Key, StoredItem, Table, WriteBack};

/// Backend-agnostic key-value storage addressed by `(namespace, id)`.
pub trait Store: Send + Sync {
    /// Persist a new item.
    ///
    /// Assigns an id through `IdSetter` when the item's id is empty, and sets
    /// both timestamps through `TimeTracker` when present. Fails with
    /// `DuplicateKey` if the key already exists.
    fn create(&self, item: &mut dyn Item) -> StoreResult<()>;

    /// Decode the stored record for the item's key into the item.
    fn read(&self, item: &mut dyn Item) -> StoreResult<()>;

    /// Replace the stored content of an existing item.
    ///
    /// Refreshes `updated_at` and leaves `created_at` at its stored value.
    fn update(&self, item: &mut dyn Item) -> StoreResult<()>;

    /// Remove an existing item.
    fn delete(&self, item: &dyn Item) -> StoreResult<()>;

    /// One page of the factory's namespace, filtered then sorted, plus the
    /// filtered total.
    fn list<F: Factory>(&self, factory: &F, opts: &ListOpt<F::Item>)
        -> StoreResult<Listing<F::Item>>;

    /// Release backend resources. Safe to call more than once.
    fn close(&self) -> StoreResult<()>;
}

impl<S: Store> Store for Arc<S> {
    fn create(&self, item: &mut dyn Item) -> StoreResult<()> {
        (**self).create(item)
    }

    fn read(&self, item: &mut dyn Item) -> StoreResult<()> {
        (**self).read(item)
    }

    fn update(&self, item: &mut dyn Item) -> StoreResult<()> {
        (**self).update(item)
    }

    fn delete(&self, item: &dyn Item) -> StoreResult<()> {
        (**self).delete(item)
    }

    fn list<F: Factory>(
        &self,
        factory: &F,
        opts: &ListOpt<F::Item>,
    ) -> StoreResult<Listing<F::Item>> {
        (**self).list(factory, opts)
    }

    fn close(&self) -> StoreResult<()> {
        (**self).close()
    }
}
