//! `MizigoSmart` Session Gate.
//!
//! Decides, for every page of the site, whether a valid session exists, who
//! the user is, and what they may do. It persists sessions in a key-value
//! store, enforces the protected-page table, and projects the session onto
//! the navbar and user-info slots.
//!
//! # Architecture
//!
//! The gate owns no browser state directly. Everything it touches is a
//! capability handed to [`SessionGateBuilder`]:
//!
//! - [`KeyValueStore`] - persistent and per-tab storage
//! - [`Clock`] - wall-clock time for expiry
//! - [`Navigator`] - current location and redirects
//! - [`Notifier`] - transient user messages
//! - [`PageSurface`] - navbar, logout control, user-info slots
//!
//! Native builds use the in-memory and file-backed implementations in this
//! crate. With the `web` feature on `wasm32`, [`web`] provides the browser
//! implementations and a one-call [`web::boot`].
//!
//! # Example
//!
//! ```
//! use mizigo_core::{Role, User};
//! use mizigo_gate::{MemoryStore, RecordingNavigator, SessionGate};
//!
//! let nav = RecordingNavigator::new("/track.html");
//! let gate = SessionGate::builder(MemoryStore::new())
//!     .navigator(nav.clone())
//!     .build();
//!
//! assert!(!gate.protect_page());
//! assert_eq!(nav.last_redirect().map(|r| r.url).as_deref(), Some("login.html"));
//!
//! gate.save_session(&User::new("u1", "Ann", Role::Customer));
//! assert!(gate.has_permission("track_shipment"));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clock;
pub mod config;
mod error;
mod gate;
pub mod navigation;
pub mod notify;
pub mod pages;
pub mod permissions;
pub mod storage;
pub mod surface;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod web;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GateConfig};
pub use error::StorageError;
pub use gate::{SessionGate, SessionGateBuilder, SessionStatus};
pub use navigation::{Navigator, RecordingNavigator, Redirect};
pub use notify::{
    NoopNotifier, Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier,
};
pub use pages::{PageRule, RedirectTarget, Requirement};
pub use storage::{FailureMode, FileStore, KeyValueStore, MemoryStore, keys};
pub use surface::{
    LogoutHandler, NavbarState, NoopSurface, PageSurface, RecordingSurface, UserSlot,
};
