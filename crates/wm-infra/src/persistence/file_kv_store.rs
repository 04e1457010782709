//! File-based key/value store
//!
//! One JSON object of string keys to string values, rewritten on every
//! change. Stands in for browser local storage.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};
use wm_domain::repository::KeyValueStore;
use wm_types::{ConfigError, StorageError};

/// Environment variable overriding the storage file location
pub const STORAGE_ENV: &str = "WM_CONSOLE_STORAGE";

/// `$WM_CONSOLE_STORAGE`, else `<config dir>/wm-console/storage.json`
pub fn default_storage_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(STORAGE_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let dir = dirs::config_dir().ok_or(ConfigError::NotFound)?;
    Ok(dir.join("wm-console").join("storage.json"))
}

pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open the store at `path`, creating parent directories.
    ///
    /// A missing file is an empty store. A file that is not a JSON object of
    /// strings is logged and treated as empty; it is overwritten on the next
    /// write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader).unwrap_or_else(|e| {
                warn!("ignoring unreadable storage file {}: {}", path.display(), e);
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };
        debug!("opened storage {} ({} keys)", path.display(), entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, entries)
            .map_err(|e| StorageError::Corrupted(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.lock();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileKeyValueStore::open(&path).unwrap();
        store.set("wm_dev_console_cfg", r#"{"baseUrl":"http://x"}"#).unwrap();
        store.set("wtn:autoOpen", "0").unwrap();
        store.remove("wtn:autoOpen").unwrap();
        drop(store);

        let reopened = FileKeyValueStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("wm_dev_console_cfg").unwrap().as_deref(),
            Some(r#"{"baseUrl":"http://x"}"#)
        );
        assert_eq!(reopened.get("wtn:autoOpen").unwrap(), None);
    }

    #[test]
    fn test_garbage_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json at all").unwrap();

        let store = FileKeyValueStore::open(&path).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
        store.set("k", "v").unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"k\""));
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(dir.path().join("s.json")).unwrap();
        assert!(store.remove("nope").is_ok());
        assert!(!store.path().exists());
    }
}
