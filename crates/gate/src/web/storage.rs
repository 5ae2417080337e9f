use web_sys::Storage;

use super::js_error;
use crate::{KeyValueStore, StorageError};

/// `localStorage` or `sessionStorage`.
#[derive(Debug, Clone)]
pub struct BrowserStorage {
    storage: Storage,
}

impl BrowserStorage {
    /// The origin's persistent `localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the browser denies access.
    pub fn local() -> Result<Self, StorageError> {
        let window = window()?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(js_error(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage missing".to_owned()))?;
        Ok(Self { storage })
    }

    /// The tab's `sessionStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the browser denies access.
    pub fn session() -> Result<Self, StorageError> {
        let window = window()?;
        let storage = window
            .session_storage()
            .map_err(|e| StorageError::Unavailable(js_error(&e)))?
            .ok_or_else(|| StorageError::Unavailable("sessionStorage missing".to_owned()))?;
        Ok(Self { storage })
    }
}

fn window() -> Result<web_sys::Window, StorageError> {
    web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_owned()))
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(js_error(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // The only write failure browsers raise is QuotaExceededError.
        self.storage.set_item(key, value).map_err(|e| {
            tracing::debug!("setItem({key}) failed: {}", js_error(&e));
            StorageError::QuotaExceeded {
                key: key.to_owned(),
            }
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::Unavailable(js_error(&e)))
    }
}
