use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),
}

/// Key-value contract for persisted app state.
///
/// Values are opaque strings; callers own the JSON encoding. A missing key
/// is `Ok(None)`, never an error.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Read` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Write` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Write` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Read(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Write(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Write(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Store that keeps each key in its own `<key>.json` file under one
/// directory.
///
/// Keys are used verbatim as file stems, so they must be valid file names.
/// The fixed keys this app persists under all are.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Write` if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::Write(e.to_string()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key), value).map_err(|e| StorageError::Write(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Write(e.to_string())),
        }
    }
}

/// Store that fails every operation, for exercising degraded paths.
#[derive(Clone, Copy, Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Read("store unavailable".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write("store unavailable".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Write("store unavailable".into()))
    }
}

/// Aggregates the key-value backend behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub store: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Open a file-backed storage rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory cannot be created.
    pub fn json_file(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Ok(Self {
            store: Arc::new(JsonFileStore::new(dir)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::process;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("fiche-store-{}-{name}", process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn memory_store_round_trips_values() {
        let store = MemoryStore::new();
        assert!(store.get("missing").unwrap().is_none());

        store.set("progress", "{\"completed\":[]}").unwrap();
        assert_eq!(
            store.get("progress").unwrap().as_deref(),
            Some("{\"completed\":[]}")
        );

        store.set("progress", "{}").unwrap();
        assert_eq!(store.get("progress").unwrap().as_deref(), Some("{}"));

        store.remove("progress").unwrap();
        assert!(store.get("progress").unwrap().is_none());
    }

    #[test]
    fn file_store_round_trips_values() {
        let store = JsonFileStore::new(temp_dir("round-trip")).unwrap();
        assert!(store.get("streaks").unwrap().is_none());

        store.set("streaks", "{\"currentStreak\":3}").unwrap();
        assert_eq!(
            store.get("streaks").unwrap().as_deref(),
            Some("{\"currentStreak\":3}")
        );

        store.remove("streaks").unwrap();
        assert!(store.get("streaks").unwrap().is_none());
        // removing again still succeeds
        store.remove("streaks").unwrap();
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = temp_dir("reopen");
        {
            let store = JsonFileStore::new(&dir).unwrap();
            store.set("history", "[]").unwrap();
        }

        let reopened = JsonFileStore::new(&dir).unwrap();
        assert_eq!(reopened.get("history").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn failing_store_surfaces_errors() {
        let store = FailingStore;
        assert!(store.get("anything").is_err());
        assert!(store.set("anything", "{}").is_err());
        assert!(store.remove("anything").is_err());
    }

    #[test]
    fn storage_aggregate_exposes_backend() {
        let storage = Storage::in_memory();
        storage.store.set("progress", "{}").unwrap();
        assert_eq!(storage.store.get("progress").unwrap().as_deref(), Some("{}"));
    }
}
