//! Items the conformance suite stores.

use serde::{Deserialize, Serialize};

use crate::item::{CodecError, Encoding, Factory, IdSetter, Item, Serializable, TimeTracker};

/// Namespace for the CRUD and natural-order scenarios.
pub const NAMESPACE: &str = "StreamSpace";
/// Namespace that must never leak into `NAMESPACE` listings.
pub const OTHER_NAMESPACE: &str = "Other";
/// Fixed id for the CRUD round trip.
pub const FIXED_ID: &str = "04791e92-0b85-11ea-8d71-362b9e155667";

/// Fully capable item: serializable, time-tracked and id-assignable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteItem {
    pub namespace: String,
    pub id: String,
    pub rand_str: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SuiteItem {
    pub fn new(namespace: &str, id: &str, rand_str: &str) -> Self {
        SuiteItem {
            namespace: namespace.to_string(),
            id: id.to_string(),
            rand_str: rand_str.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Same key, no content. Used as the target of a read.
    pub fn key_only(&self) -> Self {
        SuiteItem::new(&self.namespace, &self.id, "")
    }
}

impl Item for SuiteItem {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn id(&self) -> &str {
        &self.id
    }

    crate::capabilities!(Serializable, TimeTracker, IdSetter);
}

impl Serializable for SuiteItem {
    fn marshal(&self) -> Result<Vec<u8>, CodecError> {
        Encoding::Json.encode(self)
    }

    fn unmarshal(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        *self = Encoding::Json.decode(bytes)?;
        Ok(())
    }
}

impl TimeTracker for SuiteItem {
    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn set_created_at(&mut self, unix: i64) {
        self.created_at = unix;
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn set_updated_at(&mut self, unix: i64) {
        self.updated_at = unix;
    }
}

impl IdSetter for SuiteItem {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Blank [`SuiteItem`]s bound to one namespace.
#[derive(Debug, Clone, Copy)]
pub struct SuiteFactory {
    pub namespace: &'static str,
}

impl SuiteFactory {
    pub const fn new(namespace: &'static str) -> Self {
        SuiteFactory { namespace }
    }
}

impl Factory for SuiteFactory {
    type Item = SuiteItem;

    fn create(&self) -> SuiteItem {
        SuiteItem::new(self.namespace, "", "")
    }
}

/// Serializable but without timestamps, so timestamp sorts must be refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntimedItem {
    pub namespace: String,
    pub id: String,
}

impl Item for UntimedItem {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn id(&self) -> &str {
        &self.id
    }

    crate::capabilities!(Serializable);
}

impl Serializable for UntimedItem {
    fn marshal(&self) -> Result<Vec<u8>, CodecError> {
        Encoding::Bitcode.encode(self)
    }

    fn unmarshal(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        *self = Encoding::Bitcode.decode(bytes)?;
        Ok(())
    }
}
