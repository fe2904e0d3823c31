//! Items - the storable unit and its optional capabilities.
//!
//! A store only needs [`Item::namespace`] and [`Item::id`] to address a record.
//! Everything else is opt-in: an item advertises a capability by returning
//! `Some(self)` from the matching probe, and stores check the probe at runtime
//! before relying on it.
//!
//! ## Example
//!
//! ```ignore
//! use serde::{Deserialize, Serialize};
//! use store_contract::{capabilities, CodecError, Encoding, Item, Serializable, TimeTracker};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Note {
//!     namespace: String,
//!     id: String,
//!     body: String,
//!     created_at: i64,
//!     updated_at: i64,
//! }
//!
//! impl Item for Note {
//!     fn namespace(&self) -> &str { &self.namespace }
//!     fn id(&self) -> &str { &self.id }
//!     capabilities!(Serializable, TimeTracker);
//! }
//! ```

mod encoding;

pub use encoding::{CodecError, Encoding};

/// Identity surface every storable entity exposes.
///
/// The `(namespace, id)` pair is the primary key in every backend.
pub trait Item {
    /// Logical partition the item belongs to (a table, a collection, a key prefix).
    fn namespace(&self) -> &str;

    /// Identifier, unique within the namespace. May be empty before `create`
    /// when the item exposes [`IdSetter`].
    fn id(&self) -> &str;

    fn as_serializable(&self) -> Option<&dyn Serializable> {
        None
    }

    fn as_serializable_mut(&mut self) -> Option<&mut dyn Serializable> {
        None
    }

    fn as_time_tracker(&self) -> Option<&dyn TimeTracker> {
        None
    }

    fn as_time_tracker_mut(&mut self) -> Option<&mut dyn TimeTracker> {
        None
    }

    fn as_id_setter(&mut self) -> Option<&mut dyn IdSetter> {
        None
    }
}

/// Encodes an item's content to bytes and decodes it back in place.
///
/// The byte layout belongs to the item. The only requirement is that
/// `unmarshal(marshal())` on an equivalent instance reproduces the same fields.
pub trait Serializable {
    fn marshal(&self) -> Result<Vec<u8>, CodecError>;
    fn unmarshal(&mut self, bytes: &[u8]) -> Result<(), CodecError>;
}

/// Creation and update timestamps, in Unix seconds.
///
/// Stores set both on create and only `updated_at` on update.
pub trait TimeTracker {
    fn created_at(&self) -> i64;
    fn set_created_at(&mut self, unix: i64);
    fn updated_at(&self) -> i64;
    fn set_updated_at(&mut self, unix: i64);
}

/// Lets the store assign an id when the caller left it empty.
pub trait IdSetter {
    fn set_id(&mut self, id: String);
}

/// An item that can always be encoded. List materializes rows into these.
pub trait SerializedItem: Item + Serializable {}

impl<T: Item + Serializable> SerializedItem for T {}

/// Produces blank items bound to one namespace.
///
/// `list` decodes every row into a fresh prototype, which keeps stores generic
/// over the concrete item type.
pub trait Factory {
    type Item: SerializedItem;

    fn create(&self) -> Self::Item;
}

impl<T, F> Factory for F
where
    T: SerializedItem,
    F: Fn() -> T,
{
    type Item = T;

    fn create(&self) -> T {
        self()
    }
}

/// Implements the capability probes of [`Item`] for the listed capabilities.
///
/// Use inside an `impl Item for T` block. Each named capability trait must
/// also be implemented for `T`.
#[macro_export]
macro_rules! capabilities {
    (@one Serializable) => {
        fn as_serializable(&self) -> Option<&dyn $crate::Serializable> {
            Some(self)
        }

        fn as_serializable_mut(&mut self) -> Option<&mut dyn $crate::Serializable> {
            Some(self)
        }
    };
    (@one TimeTracker) => {
        fn as_time_tracker(&self) -> Option<&dyn $crate::TimeTracker> {
            Some(self)
        }

        fn as_time_tracker_mut(&mut self) -> Option<&mut dyn $crate::TimeTracker> {
            Some(self)
        }
    };
    (@one IdSetter) => {
        fn as_id_setter(&mut self) -> Option<&mut dyn $crate::IdSetter> {
            Some(self)
        }
    };
    ($($cap:ident),+ $(,)?) => {
        $( $crate::capabilities!(@one $cap); )+
    };
}
