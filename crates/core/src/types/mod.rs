//! Core types for `MizigoSmart`.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod role;
pub mod user;

pub use email::{Email, EmailError};
pub use id::UserId;
pub use role::Role;
pub use user::{ANONYMOUS_DISPLAY_NAME, User};
