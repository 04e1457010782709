//! Seam traits for storage, HTTP, browser and entity lookup

use wm_types::{ApiError, EntityKind, HttpRequest, HttpResponse, StorageError, TransportError};

use crate::model::Candidate;

/// String key/value storage, the local-storage analogue
pub trait KeyValueStore: Send + Sync {
    /// Read a value; a missing key is `Ok(None)`
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Sends one HTTP request.
///
/// Any response the server produced, whatever its status, is `Ok`.
/// `Err` means no response was received.
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Opens a URL outside the console, normally in the system browser
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Source of resolution candidates for one entity kind
pub trait EntityDirectory {
    fn kind(&self) -> EntityKind;

    /// Fetch the current list from the backend
    fn fetch(&self) -> Result<Vec<Candidate>, ApiError>;
}

/// [`EntityDirectory`] backed by a closure
pub struct DirectoryFn<F> {
    kind: EntityKind,
    fetch: F,
}

impl<F> DirectoryFn<F>
where
    F: Fn() -> Result<Vec<Candidate>, ApiError>,
{
    pub fn new(kind: EntityKind, fetch: F) -> Self {
        Self { kind, fetch }
    }
}

impl<F> EntityDirectory for DirectoryFn<F>
where
    F: Fn() -> Result<Vec<Candidate>, ApiError>,
{
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn fetch(&self) -> Result<Vec<Candidate>, ApiError> {
        (self.fetch)()
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

impl<T: UrlOpener + ?Sized> UrlOpener for std::sync::Arc<T> {
    fn open(&self, url: &str) -> std::io::Result<()> {
        (**self).open(url)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
