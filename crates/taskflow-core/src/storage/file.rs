use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use super::{KeyValueStore, StorageError};

/// JSON-file-backed store.
///
/// The file is read once on open and rewritten after every mutation, so reads
/// are served from memory and never touch the disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating it lazily on first write.
    /// An unreadable or corrupt file is treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding unreadable storage file");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "Storage opened");

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn mutate<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut entries);
        self.persist(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.mutate(|entries| entries.clear())
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

        let store = FileStore::open(&path);
        store.set("access_token", "abc").unwrap();
        store.set("current_project_id", "p-1").unwrap();
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("access_token").as_deref(), Some("abc"));
        assert_eq!(reopened.get("current_project_id").as_deref(), Some("p-1"));
    }

    #[test]
    fn test_clear_is_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");

        let store = FileStore::open(&path);
        store.set("a", "1").unwrap();
        store.clear().unwrap();

        let reopened = FileStore::open(&path);
        assert!(reopened.get("a").is_none());
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::open(&path);
        assert!(store.get("anything").is_none());

        // First write replaces the corrupt file
        store.set("a", "1").unwrap();
        assert_eq!(FileStore::open(&path).get("a").as_deref(), Some("1"));
    }
}
