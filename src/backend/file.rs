//! FileStore - a store persisted as one JSON snapshot file.
//!
//! The whole table lives in memory and every mutation rewrites the snapshot
//! (temp file, then rename). Item payloads are opaque bytes, so they are
//! carried as base64 strings inside the JSON.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::item::{Factory, Item};
use crate::query::{ListOpt, Listing};
use crate::store::{Key, Store, StoreError, StoreResult, StoredItem, Table, WriteBack};

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    next_seq: u64,
    items: Vec<SnapshotItem>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotItem {
    namespace: String,
    id: String,
    seq: u64,
    created_at: i64,
    updated_at: i64,
    #[serde(with = "payload_base64")]
    payload: Vec<u8>,
}

mod payload_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(de::Error::custom)
    }
}

impl Snapshot {
    fn capture(table: &Table) -> Self {
        let mut items: Vec<SnapshotItem> = table
            .entries()
            .map(|(key, stored)| SnapshotItem {
                namespace: key.namespace.clone(),
                id: key.id.clone(),
                seq: stored.seq,
                created_at: stored.created_at,
                updated_at: stored.updated_at,
                payload: stored.payload.clone(),
            })
            .collect();
        items.sort_by_key(|item| item.seq);
        Snapshot {
            next_seq: table.next_seq(),
            items,
        }
    }

    fn into_table(self) -> Table {
        let items: HashMap<Key, StoredItem> = self
            .items
            .into_iter()
            .map(|item| {
                (
                    Key {
                        namespace: item.namespace,
                        id: item.id,
                    },
                    StoredItem {
                        seq: item.seq,
                        created_at: item.created_at,
                        updated_at: item.updated_at,
                        payload: item.payload,
                    },
                )
            })
            .collect();
        Table::from_parts(items, self.next_seq)
    }
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    table: RwLock<Table>,
    clock: Arc<dyn Clock>,
    closed: AtomicBool,
}

/// Store persisted to a single JSON file. Clones share one open file.
///
/// A change becomes visible only once its snapshot is on disk. If the write
/// fails the operation reports `Backend` and neither the store nor the
/// caller's item keeps the change.
#[derive(Clone, Debug)]
pub struct FileStore {
    inner: Arc<Inner>,
}

fn io_error(context: &str, path: &Path, err: io::Error) -> StoreError {
    StoreError::Backend(format!("{context} {}: {err}", path.display()))
}

/// Sibling the snapshot is written to before the rename, `<file name>.tmp`.
fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}

impl FileStore {
    /// Open the snapshot at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    pub fn open_with_clock(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let table = match fs::read(&path) {
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|err| {
                    StoreError::Backend(format!("corrupt snapshot {}: {err}", path.display()))
                })?;
                snapshot.into_table()
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)
                        .map_err(|err| io_error("cannot create directory for", &path, err))?;
                }
                Table::default()
            }
            Err(err) => return Err(io_error("cannot read", &path, err)),
        };
        debug!(path = %path.display(), items = table.len(), "file store opened");

        Ok(FileStore {
            inner: Arc::new(Inner {
                path,
                table: RwLock::new(table),
                clock,
                closed: AtomicBool::new(false),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self, operation: &'static str) -> StoreResult<()> {
        if self.is_closed() {
            warn!(operation, path = %self.inner.path.display(), "file store used after close");
            return Err(StoreError::Backend("store is closed".into()));
        }
        Ok(())
    }

    fn read_table(&self, operation: &'static str) -> StoreResult<RwLockReadGuard<'_, Table>> {
        self.inner
            .table
            .read()
            .map_err(|_| StoreError::Backend(format!("lock poisoned during {operation}")))
    }

    fn write_table(&self, operation: &'static str) -> StoreResult<RwLockWriteGuard<'_, Table>> {
        self.inner
            .table
            .write()
            .map_err(|_| StoreError::Backend(format!("lock poisoned during {operation}")))
    }

    fn persist(&self, table: &Table) -> StoreResult<()> {
        let path = &self.inner.path;
        let bytes = serde_json::to_vec_pretty(&Snapshot::capture(table))
            .map_err(|err| StoreError::Backend(format!("cannot encode snapshot: {err}")))?;
        let staging = staging_path(path);
        fs::write(&staging, bytes).map_err(|err| io_error("cannot write", &staging, err))?;
        fs::rename(&staging, path).map_err(|err| io_error("cannot replace", path, err))
    }

    /// Applies `apply` to a copy of the table and swaps it in once persisted.
    fn mutate(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut Table) -> StoreResult<()>,
    ) -> StoreResult<()> {
        self.ensure_open(operation)?;
        let mut table = self.write_table(operation)?;
        let mut staged = table.clone();
        apply(&mut staged)?;
        if let Err(err) = self.persist(&staged) {
            warn!(operation, %err, "snapshot write failed, change discarded");
            return Err(err);
        }
        *table = staged;
        Ok(())
    }

    /// Like `mutate`, restoring the item's id and timestamps if the write fails.
    fn mutate_item(
        &self,
        operation: &'static str,
        item: &mut dyn Item,
        apply: impl FnOnce(&mut Table, &mut dyn Item) -> StoreResult<()>,
    ) -> StoreResult<()> {
        let before = WriteBack::capture(item);
        let result = self.mutate(operation, |table| apply(table, &mut *item));
        if result.is_err() {
            before.restore(item);
        }
        result
    }
}

impl Store for FileStore {
    fn create(&self, item: &mut dyn Item) -> StoreResult<()> {
        let now = self.inner.clock.now();
        self.mutate_item("create", item, |table, item| table.create(item, now))
    }

    fn read(&self, item: &mut dyn Item) -> StoreResult<()> {
        self.ensure_open("read")?;
        self.read_table("read")?.read(item)
    }

    fn update(&self, item: &mut dyn Item) -> StoreResult<()> {
        let now = self.inner.clock.now();
        self.mutate_item("update", item, |table, item| table.update(item, now))
    }

    fn delete(&self, item: &dyn Item) -> StoreResult<()> {
        self.mutate("delete", |table| table.delete(item))
    }

    fn list<F: Factory>(
        &self,
        factory: &F,
        opts: &ListOpt<F::Item>,
    ) -> StoreResult<Listing<F::Item>> {
        self.ensure_open("list")?;
        self.read_table("list")?.list(factory, opts)
    }

    /// Flushes the snapshot, then marks the store closed. A failed flush leaves
    /// it open so `close` can be retried.
    fn close(&self) -> StoreResult<()> {
        let table = self.write_table("close")?;
        if self.is_closed() {
            return Ok(());
        }
        self.persist(&table)?;
        self.inner.closed.store(true, Ordering::SeqCst);
        debug!(path = %self.inner.path.display(), "file store closed");
        Ok(())
    }
}
