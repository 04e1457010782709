//! Persistence implementations
//!
//! File-backed and in-memory implementations of [`KeyValueStore`].
//!
//! [`KeyValueStore`]: wm_domain::repository::KeyValueStore

mod file_kv_store;
mod memory_kv_store;

pub use file_kv_store::{default_storage_path, FileKeyValueStore};
pub use memory_kv_store::MemoryKeyValueStore;
