//! Page navigation capability.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Access to the current location and to redirects.
///
/// Delayed redirects are fire-and-forget: there is no handle to cancel them,
/// and if the page has already moved on when the delay elapses the navigation
/// simply lands wherever the browser is.
pub trait Navigator {
    /// Current location (`window.location.href` in a browser).
    fn current_location(&self) -> String;

    /// Navigate now.
    fn redirect(&self, url: &str);

    /// Navigate after `delay`.
    fn redirect_after(&self, url: &str, delay: Duration);
}

/// A redirect issued through a [`RecordingNavigator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Destination.
    pub url: String,
    /// `None` for immediate redirects.
    pub delay: Option<Duration>,
}

impl Redirect {
    /// Whether the redirect happened without a delay.
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        self.delay.is_none()
    }
}

#[derive(Debug, Default)]
struct NavigatorState {
    location: String,
    history: Vec<Redirect>,
    pending: Vec<String>,
}

/// Native navigator that records redirects instead of performing them.
///
/// Immediate redirects move [`RecordingNavigator::current_location`] to the
/// destination. Delayed redirects are queued and only land when
/// [`RecordingNavigator::run_pending`] is called, standing in for the timer
/// firing. Clones share state.
#[derive(Debug, Clone)]
pub struct RecordingNavigator {
    state: Rc<RefCell<NavigatorState>>,
}

impl RecordingNavigator {
    /// Start at `location`.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(NavigatorState {
                location: location.into(),
                ..NavigatorState::default()
            })),
        }
    }

    /// Simulate the user opening `location`. Pending timers from the previous page are kept.
    pub fn set_location(&self, location: impl Into<String>) {
        self.state.borrow_mut().location = location.into();
    }

    /// Every redirect issued so far, oldest first.
    #[must_use]
    pub fn redirects(&self) -> Vec<Redirect> {
        self.state.borrow().history.clone()
    }

    /// Most recent redirect.
    #[must_use]
    pub fn last_redirect(&self) -> Option<Redirect> {
        self.state.borrow().history.last().cloned()
    }

    /// Fire every queued delayed redirect in order; the last one wins.
    /// Returns how many fired.
    pub fn run_pending(&self) -> usize {
        let mut state = self.state.borrow_mut();
        let pending = std::mem::take(&mut state.pending);
        let fired = pending.len();
        if let Some(last) = pending.into_iter().last() {
            state.location = last;
        }
        fired
    }
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for RecordingNavigator {
    fn current_location(&self) -> String {
        self.state.borrow().location.clone()
    }

    fn redirect(&self, url: &str) {
        let mut state = self.state.borrow_mut();
        state.history.push(Redirect {
            url: url.to_owned(),
            delay: None,
        });
        state.location = url.to_owned();
    }

    fn redirect_after(&self, url: &str, delay: Duration) {
        let mut state = self.state.borrow_mut();
        state.history.push(Redirect {
            url: url.to_owned(),
            delay: Some(delay),
        });
        state.pending.push(url.to_owned());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_redirect_moves_location() {
        let nav = RecordingNavigator::new("/dashboard.html");
        nav.redirect("index.html");

        assert_eq!(nav.current_location(), "index.html");
        assert!(nav.last_redirect().unwrap().is_immediate());
    }

    #[test]
    fn test_delayed_redirect_waits_for_timer() {
        let nav = RecordingNavigator::new("/booking.html");
        nav.redirect_after("login.html", Duration::from_millis(1500));

        assert_eq!(nav.current_location(), "/booking.html");
        assert_eq!(
            nav.last_redirect().unwrap().delay,
            Some(Duration::from_millis(1500))
        );

        assert_eq!(nav.run_pending(), 1);
        assert_eq!(nav.current_location(), "login.html");
        assert_eq!(nav.run_pending(), 0);
    }
}
