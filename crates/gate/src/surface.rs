//! Projection of the session onto the page: navbar affordances, user-info
//! slots, and the logout control.
//!
//! The gate computes *what* to show ([`NavbarState`], slot values); a
//! [`PageSurface`] decides *how*. Surfaces must tolerate any referenced
//! element being absent from the page.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use mizigo_core::User;

/// Visibility of the session-dependent navbar items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavbarState {
    /// "Log in" link.
    pub show_login: bool,
    /// "Sign up" link.
    pub show_signup: bool,
    /// Logout control (injected when absent, removed when hidden).
    pub show_logout: bool,
    /// Link to the admin dashboard.
    pub show_admin_link: bool,
    /// Personalised greeting, shown when set.
    pub greeting: Option<String>,
}

impl NavbarState {
    /// Navbar for a visitor without a session.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            show_login: true,
            show_signup: true,
            show_logout: false,
            show_admin_link: false,
            greeting: None,
        }
    }

    /// Navbar for a signed-in user.
    #[must_use]
    pub fn for_user(user: &User) -> Self {
        let name = match user.first_name.trim() {
            "" => user.display_name(),
            first => first.to_owned(),
        };
        Self {
            show_login: false,
            show_signup: false,
            show_logout: true,
            show_admin_link: user.is_admin(),
            greeting: Some(format!("Welcome, {name}")),
        }
    }
}

/// A place on the page that displays part of the user record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserSlot {
    /// Full name (`data-user-name`).
    Name,
    /// Email address (`data-user-email`).
    Email,
    /// Any field by JSON name (`data-user="<field>"`).
    Field(String),
}

/// Callback bound to the logout control.
pub type LogoutHandler = Box<dyn Fn()>;

/// The page the gate renders onto.
pub trait PageSurface {
    /// Apply `state` to the navbar.
    fn render_navbar(&self, state: &NavbarState);

    /// Attach `handler` to the page's logout control.
    ///
    /// Returns `false` (and drops the handler) when the page has no logout control.
    fn bind_logout(&self, handler: LogoutHandler) -> bool;

    /// Slots present on the page.
    fn user_slots(&self) -> Vec<UserSlot>;

    /// Write `value` into every element for `slot`.
    fn fill_user_slot(&self, slot: &UserSlot, value: &str);
}

/// A page with no navbar and no user slots. The gate's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSurface;

impl PageSurface for NoopSurface {
    fn render_navbar(&self, _state: &NavbarState) {}

    fn bind_logout(&self, _handler: LogoutHandler) -> bool {
        false
    }

    fn user_slots(&self) -> Vec<UserSlot> {
        Vec::new()
    }

    fn fill_user_slot(&self, _slot: &UserSlot, _value: &str) {}
}

#[derive(Default)]
struct SurfaceState {
    has_logout_control: bool,
    navbar: Option<NavbarState>,
    renders: usize,
    logout_handler: Option<LogoutHandler>,
    slots: Vec<UserSlot>,
    filled: Vec<(UserSlot, String)>,
}

/// In-memory page for tests and the CLI. Clones share state.
///
/// A logout control exists if the page was built with one
/// ([`RecordingSurface::with_logout_control`]) or once a navbar render asked
/// for it to be shown.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Page markup already contains a logout control.
    #[must_use]
    pub fn with_logout_control(self) -> Self {
        self.state.borrow_mut().has_logout_control = true;
        self
    }

    /// Page markup contains `slot`.
    #[must_use]
    pub fn with_slot(self, slot: UserSlot) -> Self {
        self.state.borrow_mut().slots.push(slot);
        self
    }

    /// Last navbar rendered.
    #[must_use]
    pub fn navbar(&self) -> Option<NavbarState> {
        self.state.borrow().navbar.clone()
    }

    /// How many times the navbar was rendered.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.state.borrow().renders
    }

    /// Whether a logout handler is bound.
    #[must_use]
    pub fn logout_bound(&self) -> bool {
        self.state.borrow().logout_handler.is_some()
    }

    /// Simulate a click on the logout control. Returns `false` if nothing is bound.
    pub fn click_logout(&self) -> bool {
        // The handler may re-enter the surface, so it must not run under the borrow.
        let Some(handler) = self.state.borrow_mut().logout_handler.take() else {
            return false;
        };
        handler();
        self.state.borrow_mut().logout_handler = Some(handler);
        true
    }

    /// Value most recently written to `slot`.
    #[must_use]
    pub fn slot_value(&self, slot: &UserSlot) -> Option<String> {
        self.state
            .borrow()
            .filled
            .iter()
            .rev()
            .find(|(s, _)| s == slot)
            .map(|(_, v)| v.clone())
    }
}

impl fmt::Debug for RecordingSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RecordingSurface")
            .field("has_logout_control", &state.has_logout_control)
            .field("navbar", &state.navbar)
            .field("renders", &state.renders)
            .field("logout_bound", &state.logout_handler.is_some())
            .field("slots", &state.slots)
            .field("filled", &state.filled)
            .finish()
    }
}

impl PageSurface for RecordingSurface {
    fn render_navbar(&self, state: &NavbarState) {
        let mut inner = self.state.borrow_mut();
        inner.renders += 1;
        if state.show_logout {
            inner.has_logout_control = true;
        }
        inner.navbar = Some(state.clone());
    }

    fn bind_logout(&self, handler: LogoutHandler) -> bool {
        let mut inner = self.state.borrow_mut();
        if !inner.has_logout_control {
            return false;
        }
        inner.logout_handler = Some(handler);
        true
    }

    fn user_slots(&self) -> Vec<UserSlot> {
        self.state.borrow().slots.clone()
    }

    fn fill_user_slot(&self, slot: &UserSlot, value: &str) {
        self.state
            .borrow_mut()
            .filled
            .push((slot.clone(), value.to_owned()));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mizigo_core::Role;

    use super::*;

    #[test]
    fn test_anonymous_navbar() {
        let state = NavbarState::anonymous();
        assert!(state.show_login && state.show_signup);
        assert!(!state.show_logout && !state.show_admin_link);
        assert!(state.greeting.is_none());
    }

    #[test]
    fn test_customer_navbar() {
        let user = User::new("u1", "Ann", Role::Customer);
        let state = NavbarState::for_user(&user);
        assert!(!state.show_login && !state.show_signup);
        assert!(state.show_logout);
        assert!(!state.show_admin_link);
        assert_eq!(state.greeting.as_deref(), Some("Welcome, Ann"));
    }

    #[test]
    fn test_admin_navbar_shows_dashboard_link() {
        let user = User::new("a1", "", Role::Admin);
        let state = NavbarState::for_user(&user);
        assert!(state.show_admin_link);
        assert_eq!(state.greeting.as_deref(), Some("Welcome, User"));
    }

    #[test]
    fn test_bind_requires_control() {
        let surface = RecordingSurface::new();
        assert!(!surface.bind_logout(Box::new(|| {})));

        surface.render_navbar(&NavbarState {
            show_logout: true,
            ..NavbarState::anonymous()
        });
        assert!(surface.bind_logout(Box::new(|| {})));
        assert!(surface.logout_bound());
    }

    #[test]
    fn test_click_logout_runs_handler() {
        let clicks = Rc::new(RefCell::new(0));
        let surface = RecordingSurface::new().with_logout_control();
        let counter = Rc::clone(&clicks);
        surface.bind_logout(Box::new(move || *counter.borrow_mut() += 1));

        assert!(surface.click_logout());
        assert!(surface.click_logout());
        assert_eq!(*clicks.borrow(), 2);
    }
}
