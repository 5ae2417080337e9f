//! The session gate.
//!
//! # Lazy expiry
//!
//! Nothing sweeps expired sessions. A session stays in storage past its
//! expiry until something reads it: [`SessionGate::is_logged_in`] (and
//! everything built on it) notices the expiry and clears the stored record as
//! a side effect. Reading login state may therefore write to storage.
//!
//! # Access enforcement
//!
//! [`SessionGate::protect_page`] and the interactive `require_*` checks share
//! one enforcement path:
//!
//! - the intended page is recorded whenever the visitor has no session,
//!   whichever requirement failed;
//! - page-load protection redirects immediately, before the page renders;
//! - interactive checks notify first and redirect after
//!   [`GateConfig::redirect_delay`].

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use mizigo_core::{ANONYMOUS_DISPLAY_NAME, Email, User};

use crate::clock::{Clock, SystemClock};
use crate::config::GateConfig;
use crate::error::SessionError;
use crate::navigation::{Navigator, RecordingNavigator};
use crate::notify::{NoopNotifier, Notification, Notifier};
use crate::pages::{self, Requirement};
use crate::permissions;
use crate::storage::{KeyValueStore, MemoryStore, keys};
use crate::surface::{NavbarState, NoopSurface, PageSurface, UserSlot};

/// What the gate currently believes about the visitor.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    /// No valid session.
    Anonymous,
    /// A valid session.
    Authenticated {
        /// The signed-in user.
        user: User,
        /// When the session stops being valid.
        expires_at: DateTime<Utc>,
    },
}

/// How a failed access check leaves the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Enforcement {
    /// Redirect now, silently.
    Immediate,
    /// Notify, then redirect after the configured delay.
    Deferred,
}

struct GateInner {
    config: GateConfig,
    store: Box<dyn KeyValueStore>,
    tab_store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    navigator: Box<dyn Navigator>,
    notifier: Box<dyn Notifier>,
    surface: Box<dyn PageSurface>,
    timeout_warned: Cell<bool>,
}

/// Single source of truth for "is there a valid session, and what can it do".
///
/// Construct one per page with [`SessionGate::builder`] and hand clones to
/// page controllers; clones share everything. The gate is single-threaded
/// (`!Send`), like the browser main thread it runs on.
#[derive(Clone)]
pub struct SessionGate {
    inner: Rc<GateInner>,
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("config", &self.inner.config)
            .field("timeout_warned", &self.inner.timeout_warned.get())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SessionGate`].
///
/// Only the persistent store is required. Defaults: [`GateConfig::default`],
/// an in-memory per-tab store, [`SystemClock`], a [`RecordingNavigator`] at
/// `/`, [`NoopNotifier`], [`NoopSurface`].
pub struct SessionGateBuilder {
    config: GateConfig,
    store: Box<dyn KeyValueStore>,
    tab_store: Option<Box<dyn KeyValueStore>>,
    clock: Option<Box<dyn Clock>>,
    navigator: Option<Box<dyn Navigator>>,
    notifier: Option<Box<dyn Notifier>>,
    surface: Option<Box<dyn PageSurface>>,
}

impl SessionGateBuilder {
    /// Use `config` instead of the defaults.
    #[must_use]
    pub fn config(mut self, config: GateConfig) -> Self {
        self.config = config;
        self
    }

    /// Per-tab store holding the intended page (`sessionStorage`).
    #[must_use]
    pub fn tab_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.tab_store = Some(Box::new(store));
        self
    }

    /// Time source for expiry checks.
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Location and redirects.
    #[must_use]
    pub fn navigator(mut self, navigator: impl Navigator + 'static) -> Self {
        self.navigator = Some(Box::new(navigator));
        self
    }

    /// Sink for user-facing messages.
    #[must_use]
    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Page the navbar and user info are rendered onto.
    #[must_use]
    pub fn surface(mut self, surface: impl PageSurface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    /// Finish the gate, filling unset capabilities with their defaults.
    #[must_use]
    pub fn build(self) -> SessionGate {
        SessionGate {
            inner: Rc::new(GateInner {
                config: self.config,
                store: self.store,
                tab_store: self
                    .tab_store
                    .unwrap_or_else(|| Box::new(MemoryStore::new())),
                clock: self.clock.unwrap_or_else(|| Box::new(SystemClock)),
                navigator: self
                    .navigator
                    .unwrap_or_else(|| Box::new(RecordingNavigator::default())),
                notifier: self.notifier.unwrap_or_else(|| Box::new(NoopNotifier)),
                surface: self.surface.unwrap_or_else(|| Box::new(NoopSurface)),
                timeout_warned: Cell::new(false),
            }),
        }
    }
}

impl SessionGate {
    /// Start building a gate over the persistent `store`.
    #[must_use]
    pub fn builder(store: impl KeyValueStore + 'static) -> SessionGateBuilder {
        SessionGateBuilder {
            config: GateConfig::default(),
            store: Box::new(store),
            tab_store: None,
            clock: None,
            navigator: None,
            notifier: None,
            surface: None,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.inner.config
    }

    // =========================================================================
    // Session state
    // =========================================================================

    /// Whether a valid session exists.
    ///
    /// Returns `false` when the logged-in flag or last-login timestamp is
    /// missing. When the session has expired, or the timestamp cannot be
    /// parsed, the stored session is cleared before returning `false`.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.session_expiry().is_some()
    }

    /// The signed-in user, or `None`.
    ///
    /// May clear the session: on expiry (via [`Self::is_logged_in`]) and when
    /// the stored user record is missing or unreadable.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        if !self.is_logged_in() {
            return None;
        }
        match self.load_user() {
            Ok(user) => Some(user),
            Err(e) if e.is_corrupt() => {
                tracing::warn!("Discarding unreadable session: {e}");
                self.clear_session();
                None
            }
            Err(e) => {
                tracing::warn!("Failed to read current user: {e}");
                None
            }
        }
    }

    /// Whether the current user is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(|u| u.is_admin())
    }

    /// Whether the current user is a customer.
    #[must_use]
    pub fn is_customer(&self) -> bool {
        self.current_user().is_some_and(|u| u.is_customer())
    }

    /// Whether the current user may exercise `permission`. Unknown permissions are denied.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.current_user()
            .is_some_and(|u| permissions::role_has_permission(&u.role, permission))
    }

    /// Full view of the session, with the same lazy checks as [`Self::current_user`].
    #[must_use]
    pub fn session_status(&self) -> SessionStatus {
        let Some(expires_at) = self.session_expiry() else {
            return SessionStatus::Anonymous;
        };
        match self.current_user() {
            Some(user) => SessionStatus::Authenticated { user, expires_at },
            None => SessionStatus::Anonymous,
        }
    }

    /// Time left before the session expires; `None` without a valid session.
    #[must_use]
    pub fn remaining_time(&self) -> Option<TimeDelta> {
        self.session_expiry()
            .map(|expires_at| expires_at - self.inner.clock.now())
    }

    /// Persist a new session for `user`.
    ///
    /// Rejects a user without an identifier without touching storage. Storage
    /// failures are logged and reported as `false`; a failed write may leave
    /// some keys written, exactly as the underlying store left them.
    pub fn save_session(&self, user: &User) -> bool {
        if user.id.is_empty() {
            tracing::warn!("Refusing to save a session for a user without an id");
            return false;
        }
        match self.write_session(user) {
            Ok(()) => {
                self.inner.timeout_warned.set(false);
                tracing::info!("Session saved for user {} ({})", user.id, user.role);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to save session: {e}");
                false
            }
        }
    }

    /// Remove the session record and the per-tab intended page.
    ///
    /// Idempotent. Returns `false` only if the store reported a failure; every
    /// key is attempted regardless.
    pub fn clear_session(&self) -> bool {
        let mut ok = true;
        for key in keys::SESSION {
            if let Err(e) = self.inner.store.remove_item(key) {
                tracing::warn!("Failed to remove {key}: {e}");
                ok = false;
            }
        }
        if let Err(e) = self.inner.tab_store.remove_item(keys::INTENDED_PAGE) {
            tracing::warn!("Failed to remove {}: {e}", keys::INTENDED_PAGE);
            ok = false;
        }
        tracing::debug!("Session cleared");
        ok
    }

    /// Log out: clear the session, say goodbye, and head home after the logout delay.
    ///
    /// Always returns `true`.
    pub fn logout(&self) -> bool {
        let name = self
            .current_user()
            .map_or_else(|| ANONYMOUS_DISPLAY_NAME.to_owned(), |u| u.display_name());

        self.clear_session();
        self.inner.notifier.notify(Notification::success(format!(
            "Goodbye, {name}! You have been logged out."
        )));
        self.inner
            .navigator
            .redirect_after(&self.inner.config.home_page, self.inner.config.logout_delay);
        tracing::info!("User logged out");
        true
    }

    /// Save the session and leave the login page: back to the intended page
    /// when one was recorded, otherwise to the role's landing page.
    pub fn complete_login(&self, user: &User) -> bool {
        if !self.save_session(user) {
            return false;
        }
        let target = self
            .take_intended_page()
            .filter(|page| !pages::same_page(page, &self.inner.config.login_page))
            .unwrap_or_else(|| self.inner.config.landing_page(&user.role).to_owned());

        let name = match user.first_name.trim() {
            "" => user.display_name(),
            first => first.to_owned(),
        };
        self.inner
            .notifier
            .notify(Notification::success(format!("Welcome back, {name}!")));
        self.inner.navigator.redirect(&target);
        true
    }

    // =========================================================================
    // Access enforcement
    // =========================================================================

    /// Require a session; otherwise remember this page, notify, and redirect
    /// to `redirect_to` after the redirect delay.
    pub fn require_auth(&self, redirect_to: &str) -> bool {
        self.enforce(Requirement::LoggedIn, redirect_to, Enforcement::Deferred)
    }

    /// Require an admin session; otherwise notify and redirect after the delay.
    pub fn require_admin(&self, redirect_to: &str) -> bool {
        self.enforce(Requirement::Admin, redirect_to, Enforcement::Deferred)
    }

    /// Require a customer session; otherwise notify and redirect after the delay.
    pub fn require_customer(&self, redirect_to: &str) -> bool {
        self.enforce(Requirement::Customer, redirect_to, Enforcement::Deferred)
    }

    /// Apply the protected-page table to the current location.
    ///
    /// Unprotected pages pass. A protected page whose requirement fails is
    /// left immediately for the rule's redirect target.
    pub fn protect_page(&self) -> bool {
        let location = self.inner.navigator.current_location();
        let Some(rule) = pages::rule_for(&location) else {
            return true;
        };
        let target = self.inner.config.resolve(rule.redirect).to_owned();
        self.enforce(rule.requirement, &target, Enforcement::Immediate)
    }

    fn enforce(&self, requirement: Requirement, redirect_to: &str, mode: Enforcement) -> bool {
        let user = self.current_user();
        let allowed = match requirement {
            Requirement::LoggedIn => user.is_some(),
            Requirement::Admin => user.as_ref().is_some_and(User::is_admin),
            Requirement::Customer => user.as_ref().is_some_and(User::is_customer),
        };
        if allowed {
            return true;
        }

        if user.is_none() {
            self.remember_intended_page();
        }
        tracing::debug!(
            "Access check {requirement:?} failed, redirecting to {redirect_to} ({mode:?})"
        );
        match mode {
            Enforcement::Immediate => self.inner.navigator.redirect(redirect_to),
            Enforcement::Deferred => {
                self.inner
                    .notifier
                    .notify(Notification::warning(requirement.denial_message()));
                self.inner
                    .navigator
                    .redirect_after(redirect_to, self.inner.config.redirect_delay);
            }
        }
        false
    }

    // =========================================================================
    // Intended page & remembered email
    // =========================================================================

    /// The page recorded before the last redirect to login, if any.
    #[must_use]
    pub fn intended_page(&self) -> Option<String> {
        self.inner
            .tab_store
            .get_item(keys::INTENDED_PAGE)
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to read intended page: {e}");
                None
            })
    }

    /// Read and forget the intended page.
    pub fn take_intended_page(&self) -> Option<String> {
        let page = self.intended_page()?;
        if let Err(e) = self.inner.tab_store.remove_item(keys::INTENDED_PAGE) {
            tracing::warn!("Failed to clear intended page: {e}");
        }
        Some(page)
    }

    fn remember_intended_page(&self) {
        let location = self.inner.navigator.current_location();
        if let Err(e) = self
            .inner
            .tab_store
            .set_item(keys::INTENDED_PAGE, &location)
        {
            tracing::warn!("Failed to record intended page: {e}");
        }
    }

    /// Store the login form's "remember me" address. Survives logout.
    pub fn remember_email(&self, email: &Email) -> bool {
        self.inner
            .store
            .set_item(keys::REMEMBERED_EMAIL, email.as_str())
            .inspect_err(|e| tracing::warn!("Failed to remember email: {e}"))
            .is_ok()
    }

    /// The remembered address. A malformed stored value is removed.
    #[must_use]
    pub fn remembered_email(&self) -> Option<Email> {
        let raw = self
            .inner
            .store
            .get_item(keys::REMEMBERED_EMAIL)
            .inspect_err(|e| tracing::warn!("Failed to read remembered email: {e}"))
            .ok()
            .flatten()?;
        match Email::parse(&raw) {
            Ok(email) => Some(email),
            Err(e) => {
                tracing::warn!("Dropping malformed remembered email: {e}");
                self.forget_remembered_email();
                None
            }
        }
    }

    /// Drop the remembered address.
    pub fn forget_remembered_email(&self) -> bool {
        self.inner
            .store
            .remove_item(keys::REMEMBERED_EMAIL)
            .inspect_err(|e| tracing::warn!("Failed to forget remembered email: {e}"))
            .is_ok()
    }

    // =========================================================================
    // Page projection
    // =========================================================================

    /// Reflect the session in the navbar.
    pub fn update_navbar(&self) {
        let state = self
            .current_user()
            .map_or_else(NavbarState::anonymous, |u| NavbarState::for_user(&u));
        self.inner.surface.render_navbar(&state);
    }

    /// Show a one-time warning when the session is about to expire.
    ///
    /// Never expires the session itself. Returns whether a warning was shown.
    pub fn check_session_timeout(&self) -> bool {
        let Some(remaining) = self.remaining_time() else {
            return false;
        };
        if remaining <= TimeDelta::zero() || remaining >= self.inner.config.timeout_warning {
            return false;
        }
        if self.inner.timeout_warned.replace(true) {
            return false;
        }
        let minutes = (remaining.num_seconds() + 59) / 60;
        let unit = if minutes == 1 { "minute" } else { "minutes" };
        self.inner.notifier.notify(Notification::warning(format!(
            "Your session will expire in {minutes} {unit}. Please save your work and log in again."
        )));
        true
    }

    /// Fill the page's user-info slots from the current user.
    pub fn display_user_info(&self) {
        let Some(user) = self.current_user() else {
            return;
        };
        for slot in self.inner.surface.user_slots() {
            let value = match &slot {
                UserSlot::Name => Some(user.display_name()),
                UserSlot::Email => user.email.as_ref().map(ToString::to_string),
                UserSlot::Field(name) => user.field(name),
            };
            if let Some(value) = value {
                self.inner.surface.fill_user_slot(&slot, &value);
            }
        }
    }

    /// Page-load entry point.
    ///
    /// Runs, in order: page protection, navbar update, logout binding, the
    /// expiry warning, and user-info projection. Returns the page-protection
    /// verdict.
    pub fn init(&self) -> bool {
        let allowed = self.protect_page();
        self.update_navbar();

        let gate = self.clone();
        if self.inner.surface.bind_logout(Box::new(move || {
            gate.logout();
        })) {
            tracing::debug!("Logout control bound");
        }

        self.check_session_timeout();
        self.display_user_info();
        allowed
    }

    // =========================================================================
    // Storage helpers
    // =========================================================================

    /// Expiry of the current session, clearing it if it is no longer valid.
    fn session_expiry(&self) -> Option<DateTime<Utc>> {
        let store = &self.inner.store;
        let (flag, last_login) = match (
            store.get_item(keys::IS_LOGGED_IN),
            store.get_item(keys::LAST_LOGIN),
        ) {
            (Ok(flag), Ok(last_login)) => (flag?, last_login?),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Failed to read session state: {e}");
                return None;
            }
        };
        if flag != "true" {
            return None;
        }

        let last_login = match DateTime::parse_from_rfc3339(&last_login) {
            Ok(t) => t.with_timezone(&Utc),
            Err(e) => {
                tracing::warn!("Discarding session with invalid last login {last_login:?}: {e}");
                self.clear_session();
                return None;
            }
        };

        let timeout = self.inner.config.session_timeout;
        let now = self.inner.clock.now();
        if now - last_login > timeout {
            tracing::info!("Session expired (last login {last_login})");
            self.clear_session();
            return None;
        }
        // Past the representable range the session simply never expires.
        Some(
            last_login
                .checked_add_signed(timeout)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    }

    fn load_user(&self) -> Result<User, SessionError> {
        let raw = self
            .inner
            .store
            .get_item(keys::CURRENT_USER)?
            .ok_or(SessionError::MissingUser)?;
        let user: User = serde_json::from_str(&raw)?;
        if user.id.is_empty() {
            return Err(SessionError::MissingUserId);
        }
        Ok(user)
    }

    fn write_session(&self, user: &User) -> Result<(), SessionError> {
        let json = serde_json::to_string(user)?;
        let now = self
            .inner
            .clock
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let store = &self.inner.store;
        store.set_item(keys::CURRENT_USER, &json)?;
        store.set_item(keys::IS_LOGGED_IN, "true")?;
        store.set_item(keys::LAST_LOGIN, &now)?;
        Ok(())
    }
}
