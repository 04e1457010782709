//! Infrastructure layer - seam implementations for storage, HTTP and the browser

pub mod browser;
pub mod persistence;
pub mod transport;

pub use browser::SystemBrowser;
pub use persistence::{default_storage_path, FileKeyValueStore, MemoryKeyValueStore};
pub use transport::UreqTransport;
