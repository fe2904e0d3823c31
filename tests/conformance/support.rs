//! Deliberately broken stores and shared test setup.

use store_contract::{
    Factory, InMemoryStore, Item, ListOpt, Listing, Store, StoreError, StoreResult,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Drops the filter before listing.
pub struct IgnoresFilter(pub InMemoryStore);

impl Store for IgnoresFilter {
    fn create(&self, item: &mut dyn Item) -> StoreResult<()> {
        self.0.create(item)
    }

    fn read(&self, item: &mut dyn Item) -> StoreResult<()> {
        self.0.read(item)
    }

    fn update(&self, item: &mut dyn Item) -> StoreResult<()> {
        self.0.update(item)
    }

    fn delete(&self, item: &dyn Item) -> StoreResult<()> {
        self.0.delete(item)
    }

    fn list<F: Factory>(
        &self,
        factory: &F,
        opts: &ListOpt<F::Item>,
    ) -> StoreResult<Listing<F::Item>> {
        let unfiltered = ListOpt::new(opts.page, opts.limit).sort(opts.sort);
        self.0.list(factory, &unfiltered)
    }

    fn close(&self) -> StoreResult<()> {
        self.0.close()
    }
}

/// Treats create of an existing key as an update.
pub struct Upserting(pub InMemoryStore);

impl Store for Upserting {
    fn create(&self, item: &mut dyn Item) -> StoreResult<()> {
        match self.0.create(item) {
            Err(StoreError::DuplicateKey { .. }) => self.0.update(item),
            other => other,
        }
    }

    fn read(&self, item: &mut dyn Item) -> StoreResult<()> {
        self.0.read(item)
    }

    fn update(&self, item: &mut dyn Item) -> StoreResult<()> {
        self.0.update(item)
    }

    fn delete(&self, item: &dyn Item) -> StoreResult<()> {
        self.0.delete(item)
    }

    fn list<F: Factory>(
        &self,
        factory: &F,
        opts: &ListOpt<F::Item>,
    ) -> StoreResult<Listing<F::Item>> {
        self.0.list(factory, opts)
    }

    fn close(&self) -> StoreResult<()> {
        self.0.close()
    }
}
