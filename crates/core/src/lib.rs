//! `MizigoSmart` Core - Shared types library.
//!
//! This crate provides common types used across all `MizigoSmart` components:
//! - `gate` - Client-side session gate and page protection
//! - `cli` - Command-line driver for inspecting and exercising sessions
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! browser bindings. This keeps it lightweight and allows it to be used
//! anywhere, including `wasm32` builds.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for user IDs, emails, roles, and the user record

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
