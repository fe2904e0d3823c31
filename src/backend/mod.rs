//! Bundled backends. Both pass the full conformance suite.

mod file;
mod in_memory;

pub use file::FileStore;
pub use in_memory::InMemoryStore;
