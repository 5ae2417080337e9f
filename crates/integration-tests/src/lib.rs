//! Integration tests for the `MizigoSmart` session gate.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mizigo-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_lifecycle` - Persistence, lazy expiry, corruption, logout
//! - `page_protection` - Protected pages, access checks, intended-page round trip
//! - `page_projection` - Navbar, user-info slots, expiry warning, `init`
//!
//! # Harness
//!
//! A [`Site`] is one browser profile: `localStorage`, one tab's
//! `sessionStorage`, and a controllable clock. Each [`Site::open`] is a fresh
//! page load sharing that state, the way separate pages of the site share the
//! browser's storage.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use mizigo_gate::{
    Clock, GateConfig, KeyValueStore, ManualClock, MemoryStore, RecordingNavigator,
    RecordingNotifier, RecordingSurface, SessionGate, StorageError, UserSlot, keys,
};

/// Fixed starting instant for every site.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-06-01T09:30:00Z")
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

/// One browser profile shared by every page opened on it.
#[derive(Debug, Clone)]
pub struct Site {
    pub local: MemoryStore,
    pub tab: MemoryStore,
    pub clock: ManualClock,
    pub config: GateConfig,
}

/// A single page load.
#[derive(Debug)]
pub struct Page {
    pub gate: SessionGate,
    pub navigator: RecordingNavigator,
    pub notifier: RecordingNotifier,
    pub surface: RecordingSurface,
}

impl Default for Site {
    fn default() -> Self {
        Self::new()
    }
}

impl Site {
    /// Empty storage, clock at [`epoch`], default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            local: MemoryStore::new(),
            tab: MemoryStore::new(),
            clock: ManualClock::new(epoch()),
            config: GateConfig::default(),
        }
    }

    /// Open `location` without running any page-load logic.
    #[must_use]
    pub fn open(&self, location: &str) -> Page {
        let navigator = RecordingNavigator::new(location);
        let notifier = RecordingNotifier::new();
        let surface = RecordingSurface::new()
            .with_slot(UserSlot::Name)
            .with_slot(UserSlot::Email)
            .with_slot(UserSlot::Field("phone".to_owned()));
        let gate = SessionGate::builder(self.local.clone())
            .config(self.config.clone())
            .tab_store(self.tab.clone())
            .clock(self.clock.clone())
            .navigator(navigator.clone())
            .notifier(notifier.clone())
            .surface(surface.clone())
            .build();
        Page {
            gate,
            navigator,
            notifier,
            surface,
        }
    }

    /// Write a raw session the way the site's login script would, logged in
    /// `age` before now.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store has a failure mode set.
    pub fn seed_session(
        &self,
        user_json: &serde_json::Value,
        age: TimeDelta,
    ) -> Result<(), StorageError> {
        let last_login = (self.clock.now() - age).to_rfc3339_opts(SecondsFormat::Millis, true);
        self.local.set_item(keys::CURRENT_USER, &user_json.to_string())?;
        self.local.set_item(keys::IS_LOGGED_IN, "true")?;
        self.local.set_item(keys::LAST_LOGIN, &last_login)
    }

    /// Whether any of the three session keys remain in `localStorage`.
    #[must_use]
    pub fn has_session_keys(&self) -> bool {
        keys::SESSION.iter().any(|key| self.local.contains(key))
    }
}
