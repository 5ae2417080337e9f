use std::time::Duration;

use gloo_timers::callback::Timeout;

use super::js_error;
use crate::Navigator;

/// `window.location`, with delayed redirects on a forgotten `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowNavigator;

impl Navigator for WindowNavigator {
    fn current_location(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default()
    }

    fn redirect(&self, url: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.location().set_href(url) {
            tracing::warn!("Redirect to {url} failed: {}", js_error(&e));
        }
    }

    fn redirect_after(&self, url: &str, delay: Duration) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let url = url.to_owned();
        Timeout::new(millis, move || Self.redirect(&url)).forget();
    }
}
