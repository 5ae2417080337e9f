//! Command implementations.

#![allow(clippy::print_stdout)] // Command output

pub mod page;
pub mod session;

use std::path::PathBuf;

use mizigo_core::EmailError;
use mizigo_gate::{
    ConfigError, FileStore, GateConfig, RecordingNavigator, RecordingSurface, SessionGate,
    TracingNotifier, UserSlot,
};
use thiserror::Error;

const DEFAULT_STATE_FILE: &str = ".mizigo/session.json";

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Gate configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The gate refused to save the session.
    #[error("Could not save session for user {0:?}")]
    SaveFailed(String),
}

/// Everything a command needs to build a gate for one simulated page load.
#[derive(Debug)]
pub struct Context {
    config: GateConfig,
    state_file: PathBuf,
}

/// A gate wired to recording page capabilities, plus handles to inspect them.
pub struct PageLoad {
    pub gate: SessionGate,
    pub navigator: RecordingNavigator,
    pub surface: RecordingSurface,
}

impl Context {
    /// Load gate settings and the state file location from the environment.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` if a gate setting is malformed.
    pub fn from_env() -> Result<Self, CliError> {
        let config = GateConfig::from_env()?;
        let state_file = std::env::var("MIZIGO_STATE_FILE")
            .map_or_else(|_| PathBuf::from(DEFAULT_STATE_FILE), PathBuf::from);
        Ok(Self::new(config, state_file))
    }

    pub const fn new(config: GateConfig, state_file: PathBuf) -> Self {
        Self { config, state_file }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Per-tab state (the intended page) lives next to the session file.
    fn tab_file(&self) -> PathBuf {
        self.state_file.with_extension("tab.json")
    }

    /// Open `location` in a fresh page.
    pub fn load(&self, location: &str) -> PageLoad {
        let navigator = RecordingNavigator::new(location);
        let surface = RecordingSurface::new()
            .with_slot(UserSlot::Name)
            .with_slot(UserSlot::Email);
        let gate = SessionGate::builder(FileStore::new(&self.state_file))
            .config(self.config.clone())
            .tab_store(FileStore::new(self.tab_file()))
            .navigator(navigator.clone())
            .notifier(TracingNotifier)
            .surface(surface.clone())
            .build();
        tracing::debug!("Loaded {location} with state {}", self.state_file.display());
        PageLoad {
            gate,
            navigator,
            surface,
        }
    }
}

/// Print every redirect the page issued.
pub fn report_redirects(navigator: &RecordingNavigator) {
    for redirect in navigator.redirects() {
        match redirect.delay {
            None => println!("-> {}", redirect.url),
            Some(delay) => println!("-> {} (after {} ms)", redirect.url, delay.as_millis()),
        }
    }
}
