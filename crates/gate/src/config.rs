//! Gate configuration.
//!
//! Every value has a production default; [`GateConfig::from_env`] lets native
//! builds (the CLI, tests against a staging copy of the site) override them.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `MIZIGO_SESSION_TIMEOUT_SECS` - Session lifetime after login (default: 86400, 24 hours; at most ten years)
//! - `MIZIGO_TIMEOUT_WARNING_SECS` - Warn when less than this remains (default: 300; at most ten years)
//! - `MIZIGO_LOGOUT_DELAY_MS` - Delay before the post-logout redirect (default: 1500)
//! - `MIZIGO_REDIRECT_DELAY_MS` - Delay before interactive access-check redirects (default: 2000)
//! - `MIZIGO_LOGIN_PAGE` - Login page URL (default: login.html)
//! - `MIZIGO_HOME_PAGE` - Site root URL (default: index.html)
//! - `MIZIGO_DASHBOARD_PAGE` - Admin landing page URL (default: dashboard.html)

use std::time::Duration;

use chrono::TimeDelta;
use mizigo_core::Role;
use thiserror::Error;

use crate::pages::RedirectTarget;

const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 24 * 60 * 60;
const DEFAULT_TIMEOUT_WARNING_SECS: i64 = 5 * 60;
const DEFAULT_LOGOUT_DELAY_MS: u64 = 1500;
const DEFAULT_REDIRECT_DELAY_MS: u64 = 2000;
/// Upper bound for configured durations: ten years.
const MAX_DURATION_SECS: i64 = 10 * 365 * 24 * 60 * 60;
const DEFAULT_LOGIN_PAGE: &str = "login.html";
const DEFAULT_HOME_PAGE: &str = "index.html";
const DEFAULT_DASHBOARD_PAGE: &str = "dashboard.html";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Session gate configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// How long a session stays valid after login.
    pub session_timeout: TimeDelta,
    /// Remaining-time threshold under which the expiry warning is shown.
    pub timeout_warning: TimeDelta,
    /// Delay between the logout notification and the redirect home.
    pub logout_delay: Duration,
    /// Delay between an access-denied notification and its redirect.
    pub redirect_delay: Duration,
    /// Login page URL.
    pub login_page: String,
    /// Site root URL.
    pub home_page: String,
    /// Where admins land after logging in.
    pub dashboard_page: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            session_timeout: TimeDelta::seconds(DEFAULT_SESSION_TIMEOUT_SECS),
            timeout_warning: TimeDelta::seconds(DEFAULT_TIMEOUT_WARNING_SECS),
            logout_delay: Duration::from_millis(DEFAULT_LOGOUT_DELAY_MS),
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
            login_page: DEFAULT_LOGIN_PAGE.to_owned(),
            home_page: DEFAULT_HOME_PAGE.to_owned(),
            dashboard_page: DEFAULT_DASHBOARD_PAGE.to_owned(),
        }
    }
}

impl GateConfig {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let session_timeout = match lookup("MIZIGO_SESSION_TIMEOUT_SECS") {
            Some(raw) => parse_positive_secs("MIZIGO_SESSION_TIMEOUT_SECS", &raw)?,
            None => defaults.session_timeout,
        };
        let timeout_warning = match lookup("MIZIGO_TIMEOUT_WARNING_SECS") {
            Some(raw) => parse_positive_secs("MIZIGO_TIMEOUT_WARNING_SECS", &raw)?,
            None => defaults.timeout_warning,
        };
        let logout_delay = match lookup("MIZIGO_LOGOUT_DELAY_MS") {
            Some(raw) => parse_millis("MIZIGO_LOGOUT_DELAY_MS", &raw)?,
            None => defaults.logout_delay,
        };
        let redirect_delay = match lookup("MIZIGO_REDIRECT_DELAY_MS") {
            Some(raw) => parse_millis("MIZIGO_REDIRECT_DELAY_MS", &raw)?,
            None => defaults.redirect_delay,
        };

        Ok(Self {
            session_timeout,
            timeout_warning,
            logout_delay,
            redirect_delay,
            login_page: page_or_default(&lookup, "MIZIGO_LOGIN_PAGE", defaults.login_page)?,
            home_page: page_or_default(&lookup, "MIZIGO_HOME_PAGE", defaults.home_page)?,
            dashboard_page: page_or_default(
                &lookup,
                "MIZIGO_DASHBOARD_PAGE",
                defaults.dashboard_page,
            )?,
        })
    }

    /// URL for a symbolic redirect target.
    #[must_use]
    pub fn resolve(&self, target: RedirectTarget) -> &str {
        match target {
            RedirectTarget::Login => &self.login_page,
            RedirectTarget::Home => &self.home_page,
        }
    }

    /// Where a freshly logged-in user goes when no intended page is recorded.
    #[must_use]
    pub fn landing_page(&self, role: &Role) -> &str {
        match role {
            Role::Admin => &self.dashboard_page,
            Role::Customer | Role::Other(_) => &self.home_page,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a number of seconds in `1..=MAX_DURATION_SECS`.
fn parse_positive_secs(key: &str, raw: &str) -> Result<TimeDelta, ConfigError> {
    let secs = raw
        .trim()
        .parse::<i64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs <= 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be positive (got {secs})"),
        ));
    }
    if secs > MAX_DURATION_SECS {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be at most {MAX_DURATION_SECS} (got {secs})"),
        ));
    }
    TimeDelta::try_seconds(secs)
        .ok_or_else(|| ConfigError::InvalidEnvVar(key.to_string(), "out of range".to_string()))
}

/// Parse a number of milliseconds (zero allowed).
fn parse_millis(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// A page URL override; blank values are rejected.
fn page_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: String,
) -> Result<String, ConfigError> {
    match lookup(key) {
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "cannot be blank".to_string(),
        )),
        Some(raw) => Ok(raw.trim().to_owned()),
        None => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GateConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, GateConfig::default());
        assert_eq!(config.session_timeout, TimeDelta::hours(24));
        assert_eq!(config.timeout_warning, TimeDelta::minutes(5));
        assert_eq!(config.login_page, "login.html");
        assert_eq!(config.home_page, "index.html");
    }

    #[test]
    fn test_overrides() {
        let config = GateConfig::from_lookup(lookup_from(&[
            ("MIZIGO_SESSION_TIMEOUT_SECS", "3600"),
            ("MIZIGO_LOGOUT_DELAY_MS", "0"),
            ("MIZIGO_LOGIN_PAGE", " /auth/login.html "),
        ]))
        .unwrap();
        assert_eq!(config.session_timeout, TimeDelta::hours(1));
        assert_eq!(config.logout_delay, Duration::ZERO);
        assert_eq!(config.login_page, "/auth/login.html");
        assert_eq!(config.home_page, "index.html");
    }

    #[test]
    fn test_rejects_non_numeric_timeout() {
        let err = GateConfig::from_lookup(lookup_from(&[("MIZIGO_SESSION_TIMEOUT_SECS", "a day")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "MIZIGO_SESSION_TIMEOUT_SECS"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        assert!(GateConfig::from_lookup(lookup_from(&[("MIZIGO_SESSION_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn test_rejects_oversized_timeout() {
        let err = GateConfig::from_lookup(lookup_from(&[(
            "MIZIGO_SESSION_TIMEOUT_SECS",
            "9000000000000",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "MIZIGO_SESSION_TIMEOUT_SECS"));

        let ten_years = MAX_DURATION_SECS.to_string();
        let config =
            GateConfig::from_lookup(lookup_from(&[("MIZIGO_SESSION_TIMEOUT_SECS", ten_years.as_str())]))
                .unwrap();
        assert_eq!(config.session_timeout, TimeDelta::days(10 * 365));
    }

    #[test]
    fn test_rejects_blank_page() {
        assert!(GateConfig::from_lookup(lookup_from(&[("MIZIGO_HOME_PAGE", "  ")])).is_err());
    }

    #[test]
    fn test_landing_page_by_role() {
        let config = GateConfig::default();
        assert_eq!(config.landing_page(&Role::Admin), "dashboard.html");
        assert_eq!(config.landing_page(&Role::Customer), "index.html");
        assert_eq!(
            config.landing_page(&Role::Other("dispatcher".to_owned())),
            "index.html"
        );
    }

    #[test]
    fn test_resolve_targets() {
        let config = GateConfig::default();
        assert_eq!(config.resolve(RedirectTarget::Login), "login.html");
        assert_eq!(config.resolve(RedirectTarget::Home), "index.html");
    }
}
