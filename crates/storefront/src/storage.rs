//! Local persistent key/value storage.
//!
//! Session state survives restarts by being written here on every change.
//! [`FileStore`] keeps one JSON document per key in a state directory;
//! [`MemoryStore`] is a process-local stand-in for tests and ephemeral runs.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from the storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Keys become file names, so they are restricted to `[A-Za-z0-9_-]`.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A string-valued key/value store that persists across runs.
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write fails.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the delete fails.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go through a temporary file in the same directory and are renamed
/// into place, so a crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Directory backing this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };

        let mut temp = tempfile::NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        temp.write_all(value.as_bytes()).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store. Contents are lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_set_get_remove() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path().join("state")).unwrap();

        assert_eq!(store.get("cartItems").unwrap(), None);

        store.set("cartItems", "[]").unwrap();
        assert_eq!(store.get("cartItems").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("state/cartItems.json").exists());

        store.set("cartItems", "[1]").unwrap();
        assert_eq!(store.get("cartItems").unwrap().as_deref(), Some("[1]"));

        store.remove("cartItems").unwrap();
        assert_eq!(store.get("cartItems").unwrap(), None);
    }

    #[test]
    fn test_file_store_remove_missing_key_succeeds() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert!(store.remove("userInfo").is_ok());
    }

    #[test]
    fn test_file_store_values_survive_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        FileStore::open(dir.path())
            .unwrap()
            .set("userInfo", "{}")
            .unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("userInfo").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let mut store = MemoryStore::new();
        for key in ["", "../escape", "a/b", "dot.json"] {
            assert!(matches!(
                store.set(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }
        assert!(store.is_empty());
    }
}
