//! InMemoryStore - HashMap-backed store for testing and development.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::item::{Factory, Item};
use crate::query::{ListOpt, Listing};
use crate::store::{Store, StoreError, StoreResult, Table};

/// In-memory store backed by a HashMap keyed on `(namespace, id)`.
///
/// Clone-friendly via Arc: clones share storage, clock and closed state.
#[derive(Clone, Debug)]
pub struct InMemoryStore {
    table: Arc<RwLock<Table>>,
    clock: Arc<dyn Clock>,
    closed: Arc<AtomicBool>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Arc::new(RwLock::new(Table::default())),
            clock,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of items across all namespaces.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_table("len")?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self, operation: &'static str) -> StoreResult<()> {
        if self.is_closed() {
            warn!(operation, "in-memory store used after close");
            return Err(StoreError::Backend("store is closed".into()));
        }
        Ok(())
    }

    fn read_table(&self, operation: &'static str) -> StoreResult<RwLockReadGuard<'_, Table>> {
        self.table
            .read()
            .map_err(|_| StoreError::Backend(format!("lock poisoned during {operation}")))
    }

    fn write_table(&self, operation: &'static str) -> StoreResult<RwLockWriteGuard<'_, Table>> {
        self.table
            .write()
            .map_err(|_| StoreError::Backend(format!("lock poisoned during {operation}")))
    }
}

impl Store for InMemoryStore {
    fn create(&self, item: &mut dyn Item) -> StoreResult<()> {
        self.ensure_open("create")?;
        let now = self.clock.now();
        self.write_table("create")?.create(item, now)
    }

    fn read(&self, item: &mut dyn Item) -> StoreResult<()> {
        self.ensure_open("read")?;
        self.read_table("read")?.read(item)
    }

    fn update(&self, item: &mut dyn Item) -> StoreResult<()> {
        self.ensure_open("update")?;
        let now = self.clock.now();
        self.write_table("update")?.update(item, now)
    }

    fn delete(&self, item: &dyn Item) -> StoreResult<()> {
        self.ensure_open("delete")?;
        self.write_table("delete")?.delete(item)
    }

    fn list<F: Factory>(
        &self,
        factory: &F,
        opts: &ListOpt<F::Item>,
    ) -> StoreResult<Listing<F::Item>> {
        self.ensure_open("list")?;
        self.read_table("list")?.list(factory, opts)
    }

    fn close(&self) -> StoreResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("in-memory store closed");
        }
        Ok(())
    }
}
