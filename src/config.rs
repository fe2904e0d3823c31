//! Backend selection from configuration.
//!
//! ```ignore
//! let store = StoreConfig::from_json(r#"{ "backend": "file", "path": "data/items.json" }"#)?
//!     .open()?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::{FileStore, InMemoryStore};
use crate::clock::{Clock, SystemClock};
use crate::item::{Factory, Item};
use crate::query::{ListOpt, Listing};
use crate::store::{Store, StoreResult};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid store config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which backend to open, tagged by `backend`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    #[default]
    Memory,
    File { path: PathBuf },
}

impl StoreConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn open(&self) -> StoreResult<AnyStore> {
        self.open_with_clock(Arc::new(SystemClock))
    }

    pub fn open_with_clock(&self, clock: Arc<dyn Clock>) -> StoreResult<AnyStore> {
        match self {
            StoreConfig::Memory => Ok(AnyStore::Memory(InMemoryStore::with_clock(clock))),
            StoreConfig::File { path } => {
                Ok(AnyStore::File(FileStore::open_with_clock(path, clock)?))
            }
        }
    }
}

/// A store chosen at runtime.
#[derive(Debug, Clone)]
pub enum AnyStore {
    Memory(InMemoryStore),
    File(FileStore),
}

impl Store for AnyStore {
    fn create(&self, item: &mut dyn Item) -> StoreResult<()> {
        match self {
            AnyStore::Memory(store) => store.create(item),
            AnyStore::File(store) => store.create(item),
        }
    }

    fn read(&self, item: &mut dyn Item) -> StoreResult<()> {
        match self {
            AnyStore::Memory(store) => store.read(item),
            AnyStore::File(store) => store.read(item),
        }
    }

    fn update(&self, item: &mut dyn Item) -> StoreResult<()> {
        match self {
            AnyStore::Memory(store) => store.update(item),
            AnyStore::File(store) => store.update(item),
        }
    }

    fn delete(&self, item: &dyn Item) -> StoreResult<()> {
        match self {
            AnyStore::Memory(store) => store.delete(item),
            AnyStore::File(store) => store.delete(item),
        }
    }

    fn list<F: Factory>(
        &self,
        factory: &F,
        opts: &ListOpt<F::Item>,
    ) -> StoreResult<Listing<F::Item>> {
        match self {
            AnyStore::Memory(store) => store.list(factory, opts),
            AnyStore::File(store) => store.list(factory, opts),
        }
    }

    fn close(&self) -> StoreResult<()> {
        match self {
            AnyStore::Memory(store) => store.close(),
            AnyStore::File(store) => store.close(),
        }
    }
}
