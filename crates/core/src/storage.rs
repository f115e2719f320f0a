//! Client-side key/value storage.
//!
//! Mirrors the browser's local storage: string values under string keys, one
//! writer at a time, no coordination between processes sharing a backend.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Keys may only contain ASCII letters, digits, `.`, `-` and `_`.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    /// Underlying I/O failed.
    #[error("storage i/o error for key {key:?}")]
    Io {
        /// Key being accessed.
        key: String,

        /// Source error.
        #[source]
        source: io::Error,
    },

    /// A writer panicked while holding the storage lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// String key/value storage.
pub trait Storage: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend can't be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend can't be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend can't be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Contents live as long as the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_poisoned| StorageError::Poisoned)?;

        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_poisoned| StorageError::Poisoned)?;

        entries.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_poisoned| StorageError::Poisoned)?;

        entries.remove(key);

        Ok(())
    }
}

/// Directory-backed storage: one `<key>.json` file per key.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// reader sees either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens storage rooted at `dir`, creating the directory when missing.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the directory can't be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();

        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;

        Ok(Self { dir })
    }

    /// Storage root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            && !key.starts_with('.');

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key)?;

        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;
        let staging = path.with_extension("json.tmp");

        fs::write(&staging, value)
            .and_then(|()| fs::rename(&staging, &path))
            .map_err(|source| StorageError::Io {
                key: key.to_string(),
                source,
            })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn memory_storage_round_trips_values() -> TestResult {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get("k")?, None);

        storage.set("k", "v1")?;
        storage.set("k", "v2")?;

        assert_eq!(storage.get("k")?.as_deref(), Some("v2"));

        storage.remove("k")?;
        storage.remove("k")?;

        assert_eq!(storage.get("k")?, None);

        Ok(())
    }

    #[test]
    fn file_storage_round_trips_values() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::open(dir.path().join("nested"))?;

        assert_eq!(storage.get("rouge.cart.v1")?, None);

        storage.set("rouge.cart.v1", "{\"items\":[]}")?;

        assert_eq!(
            storage.get("rouge.cart.v1")?.as_deref(),
            Some("{\"items\":[]}")
        );
        assert!(storage.dir().join("rouge.cart.v1.json").exists());
        assert!(!storage.dir().join("rouge.cart.v1.json.tmp").exists());

        storage.remove("rouge.cart.v1")?;
        storage.remove("rouge.cart.v1")?;

        assert_eq!(storage.get("rouge.cart.v1")?, None);

        Ok(())
    }

    #[test]
    fn file_storage_rejects_path_like_keys() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::open(dir.path())?;

        for key in ["../escape", "a/b", "", ".hidden"] {
            assert!(
                matches!(storage.set(key, "x"), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }

        Ok(())
    }

    #[test]
    fn file_storage_is_shared_between_handles() -> TestResult {
        let dir = tempfile::tempdir()?;

        FileStorage::open(dir.path())?.set("shared", "1")?;

        assert_eq!(FileStorage::open(dir.path())?.get("shared")?.as_deref(), Some("1"));

        Ok(())
    }
}
