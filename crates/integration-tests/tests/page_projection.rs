//! Navbar, user-info slots, the expiry warning, and page-load `init`.

#![allow(clippy::unwrap_used)]

use chrono::TimeDelta;
use mizigo_core::{Email, Role, User};
use mizigo_gate::{NavbarState, Navigator, NotificationLevel, UserSlot};
use mizigo_integration_tests::Site;

fn ann() -> User {
    User::new("u1", "Ann", Role::Customer)
        .with_last_name("Kimaro")
        .with_email(Email::parse("ann@example.com").unwrap())
}

#[test]
fn test_init_for_anonymous_visitor_on_public_page() {
    let site = Site::new();
    let page = site.open("/index.html");

    assert!(page.gate.init());
    assert_eq!(page.surface.navbar().unwrap(), NavbarState::anonymous());
    assert!(!page.surface.logout_bound());
    assert!(page.surface.slot_value(&UserSlot::Name).is_none());
    assert!(page.navigator.redirects().is_empty());
}

#[test]
fn test_init_for_signed_in_customer() {
    let site = Site::new();
    site.open("/login.html").gate.save_session(&ann());
    let page = site.open("/profile.html");

    assert!(page.gate.init());
    let navbar = page.surface.navbar().unwrap();
    assert!(navbar.show_logout);
    assert!(!navbar.show_login && !navbar.show_admin_link);
    assert_eq!(navbar.greeting.as_deref(), Some("Welcome, Ann"));
    assert_eq!(
        page.surface.slot_value(&UserSlot::Name).as_deref(),
        Some("Ann Kimaro")
    );
    assert_eq!(
        page.surface.slot_value(&UserSlot::Email).as_deref(),
        Some("ann@example.com")
    );
    assert!(page.surface.logout_bound());
}

#[test]
fn test_logout_control_click() {
    let site = Site::new();
    site.open("/login.html").gate.save_session(&ann());
    let page = site.open("/track.html");
    page.gate.init();

    assert!(page.surface.click_logout());
    assert!(!site.has_session_keys());
    let farewell = page.notifier.entries().pop().unwrap();
    assert_eq!(
        farewell.message,
        "Goodbye, Ann Kimaro! You have been logged out."
    );
    page.navigator.run_pending();
    assert_eq!(page.navigator.current_location(), "index.html");
}

#[test]
fn test_admin_sees_dashboard_link() {
    let site = Site::new();
    site.open("/login.html")
        .gate
        .save_session(&User::new("a1", "Baraka", Role::Admin));
    let page = site.open("/dashboard.html");

    assert!(page.gate.init());
    assert!(page.surface.navbar().unwrap().show_admin_link);
}

#[test]
fn test_expiry_warning_once_per_page() {
    let site = Site::new();
    site.open("/login.html").gate.save_session(&ann());
    site.clock.advance(TimeDelta::hours(24) - TimeDelta::minutes(4));

    let page = site.open("/booking.html");
    page.gate.init();
    page.gate.check_session_timeout();
    assert_eq!(page.notifier.count(NotificationLevel::Warning), 1);

    // The session is still valid until it actually expires.
    assert!(page.gate.is_logged_in());
}

#[test]
fn test_no_warning_with_plenty_of_time_left() {
    let site = Site::new();
    site.open("/login.html").gate.save_session(&ann());
    site.clock.advance(TimeDelta::hours(12));

    let page = site.open("/booking.html");
    assert!(page.gate.init());
    assert_eq!(page.notifier.count(NotificationLevel::Warning), 0);
}

#[test]
fn test_init_redirects_before_rendering_user_info() {
    let site = Site::new();
    site.open("/login.html").gate.save_session(&ann());
    let page = site.open("/admin/dashboard.html");

    assert!(!page.gate.init());
    assert_eq!(page.navigator.current_location(), "index.html");
    // The rest of init still runs against the (signed-in) session.
    assert!(page.surface.navbar().unwrap().show_logout);
}
