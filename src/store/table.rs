//! Record table shared by the bundled backends.
//!
//! Holds the contract semantics (key checks, id assignment, timestamps,
//! encoding) once. Backends wrap it in their own locking and persistence.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use super::{StoreError, StoreResult};
use crate::item::{Factory, Item};
use crate::query::{self, ListOpt, Listing, Row};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Key {
    pub namespace: String,
    pub id: String,
}

impl Key {
    fn of(item: &dyn Item) -> Self {
        Key {
            namespace: item.namespace().to_string(),
            id: item.id().to_string(),
        }
    }

    /// Key for a new item, assigning an id when the item allows it.
    fn for_create(item: &mut dyn Item) -> StoreResult<Self> {
        if item.namespace().is_empty() {
            return Err(StoreError::InvalidKey("namespace is empty".into()));
        }
        if item.id().is_empty() {
            let namespace = item.namespace().to_string();
            match item.as_id_setter() {
                Some(setter) => setter.set_id(Uuid::new_v4().to_string()),
                None => {
                    return Err(StoreError::InvalidKey(format!(
                        "empty id in namespace {namespace} and the item cannot accept one"
                    )))
                }
            }
        }
        Ok(Key::of(item))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredItem {
    pub seq: u64,
    pub created_at: i64,
    pub updated_at: i64,
    pub payload: Vec<u8>,
}

impl StoredItem {
    fn row(&self) -> Row<'_> {
        Row {
            seq: self.seq,
            created_at: self.created_at,
            updated_at: self.updated_at,
            payload: &self.payload,
        }
    }

    /// Decode into `item` and hand it the store-side timestamps.
    fn load_into(&self, item: &mut dyn Item) -> StoreResult<()> {
        if let Some(codec) = item.as_serializable_mut() {
            if !self.payload.is_empty() {
                codec.unmarshal(&self.payload)?;
            }
        }
        if let Some(tracker) = item.as_time_tracker_mut() {
            tracker.set_created_at(self.created_at);
            tracker.set_updated_at(self.updated_at);
        }
        Ok(())
    }
}

/// What a store writes back into the caller's item: the id and timestamps.
///
/// Captured before a write so a failed write leaves the item as it was.
#[derive(Debug, Clone)]
pub(crate) struct WriteBack {
    id: String,
    stamps: Option<(i64, i64)>,
}

impl WriteBack {
    pub(crate) fn capture(item: &dyn Item) -> Self {
        WriteBack {
            id: item.id().to_string(),
            stamps: item
                .as_time_tracker()
                .map(|tracker| (tracker.created_at(), tracker.updated_at())),
        }
    }

    pub(crate) fn restore(self, item: &mut dyn Item) {
        let id_changed = item.id() != self.id;
        if id_changed {
            if let Some(setter) = item.as_id_setter() {
                setter.set_id(self.id);
            }
        }
        if let (Some((created_at, updated_at)), Some(tracker)) =
            (self.stamps, item.as_time_tracker_mut())
        {
            tracker.set_created_at(created_at);
            tracker.set_updated_at(updated_at);
        }
    }
}

/// Items without `Serializable` persist an empty payload.
fn encode(item: &dyn Item) -> StoreResult<Vec<u8>> {
    match item.as_serializable() {
        Some(codec) => Ok(codec.marshal()?),
        None => Ok(Vec::new()),
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    items: HashMap<Key, StoredItem>,
    next_seq: u64,
}

impl Table {
    pub(crate) fn from_parts(items: HashMap<Key, StoredItem>, next_seq: u64) -> Self {
        let floor = items.values().map(|stored| stored.seq).max().unwrap_or(0);
        Table {
            items,
            next_seq: next_seq.max(floor),
        }
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&Key, &StoredItem)> {
        self.items.iter()
    }

    pub(crate) fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// On error the store and `item` are both left untouched.
    pub(crate) fn create(&mut self, item: &mut dyn Item, now: i64) -> StoreResult<()> {
        let before = WriteBack::capture(item);
        let result = self.insert(item, now);
        if result.is_err() {
            before.restore(item);
        }
        result
    }

    fn insert(&mut self, item: &mut dyn Item, now: i64) -> StoreResult<()> {
        let key = Key::for_create(item)?;
        if self.items.contains_key(&key) {
            return Err(StoreError::duplicate(&key.namespace, &key.id));
        }

        if let Some(tracker) = item.as_time_tracker_mut() {
            tracker.set_created_at(now);
            tracker.set_updated_at(now);
        }
        let payload = encode(item)?;

        self.next_seq += 1;
        debug!(namespace = %key.namespace, id = %key.id, seq = self.next_seq, "item created");
        self.items.insert(
            key,
            StoredItem {
                seq: self.next_seq,
                created_at: now,
                updated_at: now,
                payload,
            },
        );
        Ok(())
    }

    pub(crate) fn read(&self, item: &mut dyn Item) -> StoreResult<()> {
        let key = Key::of(item);
        let stored = self
            .items
            .get(&key)
            .ok_or_else(|| StoreError::not_found(&key.namespace, &key.id))?;
        stored.load_into(item)
    }

    /// On error the store and `item` are both left untouched.
    pub(crate) fn update(&mut self, item: &mut dyn Item, now: i64) -> StoreResult<()> {
        let key = Key::of(item);
        let stored = self
            .items
            .get_mut(&key)
            .ok_or_else(|| StoreError::not_found(&key.namespace, &key.id))?;

        let before = WriteBack::capture(item);
        if let Some(tracker) = item.as_time_tracker_mut() {
            tracker.set_created_at(stored.created_at);
            tracker.set_updated_at(now);
        }
        let payload = match encode(item) {
            Ok(payload) => payload,
            Err(err) => {
                before.restore(item);
                return Err(err);
            }
        };
        stored.payload = payload;
        stored.updated_at = now;
        debug!(namespace = %key.namespace, id = %key.id, "item updated");
        Ok(())
    }

    pub(crate) fn delete(&mut self, item: &dyn Item) -> StoreResult<()> {
        let key = Key::of(item);
        match self.items.remove(&key) {
            Some(_) => {
                debug!(namespace = %key.namespace, id = %key.id, "item deleted");
                Ok(())
            }
            None => Err(StoreError::not_found(&key.namespace, &key.id)),
        }
    }

    pub(crate) fn list<F: Factory>(
        &self,
        factory: &F,
        opts: &ListOpt<F::Item>,
    ) -> StoreResult<Listing<F::Item>> {
        let namespace = factory.create().namespace().to_string();
        let rows = self
            .items
            .iter()
            .filter(|(key, _)| key.namespace == namespace)
            .map(|(_, stored)| stored.row());
        query::select(rows, factory, opts)
    }
}
