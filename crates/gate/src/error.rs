//! Error types for the session gate.
//!
//! None of these cross the public gate boundary: [`crate::SessionGate`]
//! logs them and degrades to "treat as anonymous". They are public so that
//! custom [`crate::KeyValueStore`] implementations can report failures.

use thiserror::Error;

/// Failures reported by a [`crate::KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store cannot be reached (disabled storage, private mode, no window).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The store refused a write because it is full.
    #[error("storage quota exceeded while writing {key}")]
    QuotaExceeded {
        /// Key that was being written.
        key: String,
    },

    /// File-backed store I/O error.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// File-backed store contents are not a JSON object of strings.
    #[error("storage file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A previous panic left the in-memory store's lock poisoned.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Internal failures while reading or writing the session record.
#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("no user record stored")]
    MissingUser,

    #[error("user record has no identifier")]
    MissingUserId,

    #[error("user record is not valid JSON: {0}")]
    MalformedUser(#[from] serde_json::Error),
}

impl SessionError {
    /// Whether the stored session itself is bad (as opposed to the store being unreachable).
    pub(crate) const fn is_corrupt(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}
