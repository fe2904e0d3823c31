use thiserror::Error;

use crate::item::CodecError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Every way a store operation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Read, update or delete of a key that does not exist.
    #[error("item not found: {namespace}:{id}")]
    NotFound { namespace: String, id: String },

    /// Create of a key that already exists.
    #[error("duplicate key: {namespace}:{id}")]
    DuplicateKey { namespace: String, id: String },

    /// Item content failed to encode or decode.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// List options the store cannot honor.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// An item whose identity cannot be stored (no namespace, or no id and no way to assign one).
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Opaque failure of the underlying medium.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn not_found(namespace: &str, id: &str) -> Self {
        StoreError::NotFound {
            namespace: namespace.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn duplicate(namespace: &str, id: &str) -> Self {
        StoreError::DuplicateKey {
            namespace: namespace.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}

impl From<CodecError> for StoreError {
    fn from(err: CodecError) -> Self {
        StoreError::Serialization(err.0)
    }
}
