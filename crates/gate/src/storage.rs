//! String-keyed storage used for the session record.
//!
//! The browser exposes two of these: `localStorage` (persistent, shared by
//! every tab) and `sessionStorage` (per tab). The gate only needs the three
//! `Storage` methods below, so native builds can swap in [`MemoryStore`] or
//! [`FileStore`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

/// Keys the gate reads and writes.
pub mod keys {
    /// JSON-serialized [`mizigo_core::User`] (persistent store).
    pub const CURRENT_USER: &str = "currentUser";

    /// `"true"` while a session exists (persistent store).
    pub const IS_LOGGED_IN: &str = "isLoggedIn";

    /// RFC 3339 timestamp of the last login (persistent store).
    pub const LAST_LOGIN: &str = "lastLogin";

    /// Email the login form pre-fills (persistent store).
    pub const REMEMBERED_EMAIL: &str = "rememberedEmail";

    /// URL the visitor wanted before being sent to log in (per-tab store).
    pub const INTENDED_PAGE: &str = "intendedPage";

    /// Every persistent key that makes up the session record.
    pub const SESSION: [&str; 3] = [CURRENT_USER, IS_LOGGED_IN, LAST_LOGIN];
}

/// Minimal key-value store with `Storage` semantics.
///
/// Implementations must be safe to call repeatedly; removing a missing key is
/// not an error.
pub trait KeyValueStore {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Failure injection for [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FailureMode {
    /// Every operation succeeds.
    #[default]
    None = 0,
    /// Writes fail with [`StorageError::QuotaExceeded`]; reads and removals succeed.
    QuotaExceeded = 1,
    /// Every operation fails with [`StorageError::Unavailable`].
    Unavailable = 2,
}

impl FailureMode {
    const fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::QuotaExceeded,
            2 => Self::Unavailable,
            _ => Self::None,
        }
    }
}

/// In-memory store for tests, the CLI's per-tab store, and native fallbacks.
///
/// Clones share the same contents, so a test can keep a handle while the
/// gate owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<BTreeMap<String, String>>>,
    failure: Arc<AtomicU8>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries.
    #[must_use]
    pub fn with_items<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = items
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            items: Arc::new(Mutex::new(map)),
            failure: Arc::default(),
        }
    }

    /// Make subsequent operations fail.
    pub fn set_failure_mode(&self, mode: FailureMode) {
        self.failure.store(mode as u8, Ordering::SeqCst);
    }

    /// Copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    /// Whether the key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.items
            .lock()
            .is_ok_and(|items| items.contains_key(key))
    }

    fn failure_mode(&self) -> FailureMode {
        FailureMode::from_u8(self.failure.load(Ordering::SeqCst))
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.failure_mode() == FailureMode::Unavailable {
            return Err(StorageError::Unavailable("memory store disabled".to_owned()));
        }
        let items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self.failure_mode() {
            FailureMode::None => {}
            FailureMode::QuotaExceeded => {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                });
            }
            FailureMode::Unavailable => {
                return Err(StorageError::Unavailable("memory store disabled".to_owned()));
            }
        }
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        if self.failure_mode() == FailureMode::Unavailable {
            return Err(StorageError::Unavailable("memory store disabled".to_owned()));
        }
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object on disk.
///
/// The file is re-read on every operation, so several processes pointed at
/// the same file behave like several tabs sharing `localStorage`: no locking,
/// last writer wins. A missing file reads as an empty store.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store at `path`. Nothing is touched until the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.load()?;
        items.insert(key.to_owned(), value.to_owned());
        self.persist(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.load()?;
        if items.remove(key).is_some() {
            self.persist(&items)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_clones_share_contents() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.set_item("a", "1").unwrap();
        assert_eq!(handle.get_item("a").unwrap().as_deref(), Some("1"));

        handle.remove_item("a").unwrap();
        assert!(store.get_item("a").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_remove_missing_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove_item("missing").is_ok());
    }

    #[test]
    fn test_memory_store_quota_failure() {
        let store = MemoryStore::with_items([("kept", "yes")]);
        store.set_failure_mode(FailureMode::QuotaExceeded);

        let err = store.set_item("k", "v").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { key } if key == "k"));
        assert_eq!(store.get_item("kept").unwrap().as_deref(), Some("yes"));
    }

    #[test]
    fn test_memory_store_unavailable() {
        let store = MemoryStore::new();
        store.set_failure_mode(FailureMode::Unavailable);
        assert!(matches!(
            store.get_item("k"),
            Err(StorageError::Unavailable(_))
        ));

        store.set_failure_mode(FailureMode::None);
        assert!(store.get_item("k").unwrap().is_none());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));
        assert!(store.get_item(keys::CURRENT_USER).unwrap().is_none());
        assert!(store.remove_item(keys::CURRENT_USER).is_ok());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        FileStore::new(&path)
            .set_item(keys::IS_LOGGED_IN, "true")
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get_item(keys::IS_LOGGED_IN).unwrap().as_deref(),
            Some("true")
        );

        reopened.remove_item(keys::IS_LOGGED_IN).unwrap();
        assert!(FileStore::new(&path)
            .get_item(keys::IS_LOGGED_IN)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get_item("k"),
            Err(StorageError::Corrupt(_))
        ));
    }
}
