use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Failure to encode or decode an item's content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CodecError(pub String);

impl CodecError {
    pub fn new(message: impl Into<String>) -> Self {
        CodecError(message.into())
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError(err.to_string())
    }
}

impl From<bitcode::Error> for CodecError {
    fn from(err: bitcode::Error) -> Self {
        CodecError(err.to_string())
    }
}

/// Ready-made byte formats for implementing [`Serializable`](super::Serializable).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Human-readable, tolerant of added fields.
    #[default]
    Json,
    /// Compact binary via bitcode's serde bridge.
    Bitcode,
}

impl Encoding {
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self {
            Encoding::Json => Ok(serde_json::to_vec(value)?),
            Encoding::Bitcode => Ok(bitcode::serialize(value)?),
        }
    }

    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, CodecError> {
        match self {
            Encoding::Json => Ok(serde_json::from_slice(bytes)?),
            Encoding::Bitcode => Ok(bitcode::deserialize(bytes)?),
        }
    }
}
