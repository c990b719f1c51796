//! Persistence port for client state.
//!
//! Values are opaque strings (JSON in practice) under a small fixed set of
//! keys. The workspace reads every key once at startup and writes through on
//! each change.

pub mod file;
pub mod memory;
pub mod models;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use anyhow::Result;

pub const DOCUMENTS_KEY: &str = "documents";
pub const CONVERSATIONS_KEY: &str = "conversations";
pub const API_KEY_KEY: &str = "apiKey";
pub const ACTIVE_DOCUMENT_KEY: &str = "activeDocumentId";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
