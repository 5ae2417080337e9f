//! Protected pages, interactive access checks, and the intended-page round trip.

#![allow(clippy::unwrap_used)]

use chrono::TimeDelta;
use mizigo_core::{Role, User};
use mizigo_gate::{Navigator, NotificationLevel, keys};
use mizigo_integration_tests::Site;
use serde_json::json;

fn customer_site() -> Site {
    let site = Site::new();
    site.seed_session(
        &json!({"id": "u1", "firstName": "Ann", "role": "customer"}),
        TimeDelta::hours(2),
    )
    .unwrap();
    site
}

fn admin_site() -> Site {
    let site = Site::new();
    site.seed_session(
        &json!({"id": "a1", "firstName": "Baraka", "role": "admin"}),
        TimeDelta::hours(2),
    )
    .unwrap();
    site
}

// =============================================================================
// protect_page
// =============================================================================

#[test]
fn test_customer_on_dashboard_is_sent_home_immediately() {
    let site = customer_site();
    let page = site.open("/dashboard.html");

    assert!(!page.gate.protect_page());
    let redirect = page.navigator.last_redirect().unwrap();
    assert_eq!(redirect.url, "index.html");
    assert!(redirect.is_immediate());
}

#[test]
fn test_customer_on_admin_dashboard_variant() {
    let site = customer_site();
    let page = site.open("https://mizigosmart.example/admin/dashboard.html");

    assert!(!page.gate.protect_page());
    assert_eq!(page.navigator.current_location(), "index.html");
}

#[test]
fn test_anonymous_on_customer_pages() {
    for path in ["/track.html", "/booking.html", "/profile.html"] {
        let site = Site::new();
        let page = site.open(path);

        assert!(!page.gate.protect_page(), "{path}");
        assert_eq!(page.navigator.current_location(), "login.html", "{path}");
        assert_eq!(page.gate.intended_page().as_deref(), Some(path));
        assert!(page.notifier.entries().is_empty(), "{path} notified");
    }
}

#[test]
fn test_anonymous_on_dashboard_goes_home_but_is_remembered() {
    let site = Site::new();
    let page = site.open("/dashboard.html");

    assert!(!page.gate.protect_page());
    assert_eq!(page.navigator.current_location(), "index.html");
    assert_eq!(page.gate.intended_page().as_deref(), Some("/dashboard.html"));
}

#[test]
fn test_signed_in_users_reach_their_pages() {
    let customer = customer_site();
    for path in ["/track.html", "/booking.html", "/profile.html", "/index.html", "/"] {
        let page = customer.open(path);
        assert!(page.gate.protect_page(), "{path}");
        assert!(page.navigator.redirects().is_empty(), "{path}");
    }

    let admin = admin_site();
    for path in ["/dashboard.html", "/admin/dashboard.html", "/track.html"] {
        assert!(admin.open(path).gate.protect_page(), "{path}");
    }
}

#[test]
fn test_unprotected_pages_never_redirect() {
    let site = Site::new();
    for path in ["/index.html", "/services.html", "/contact.html", "/login.html"] {
        let page = site.open(path);
        assert!(page.gate.protect_page(), "{path}");
        assert!(page.navigator.redirects().is_empty(), "{path}");
    }
    assert!(!site.tab.contains(keys::INTENDED_PAGE));
}

#[test]
fn test_expired_session_on_protected_page() {
    let site = Site::new();
    site.seed_session(
        &json!({"id": "u1", "firstName": "Ann", "role": "customer"}),
        TimeDelta::hours(25),
    )
    .unwrap();
    let page = site.open("/booking.html");

    assert!(!page.gate.protect_page());
    assert_eq!(page.navigator.current_location(), "login.html");
    assert!(!site.has_session_keys());
}

// =============================================================================
// Interactive checks
// =============================================================================

#[test]
fn test_require_auth_notifies_then_redirects_later() {
    let site = Site::new();
    let page = site.open("/trucks.html");

    assert!(!page.gate.require_auth("login.html"));
    assert_eq!(page.notifier.count(NotificationLevel::Warning), 1);
    assert_eq!(page.navigator.current_location(), "/trucks.html");

    page.navigator.run_pending();
    assert_eq!(page.navigator.current_location(), "login.html");
    assert_eq!(page.gate.intended_page().as_deref(), Some("/trucks.html"));
}

#[test]
fn test_require_admin_for_customer_and_admin() {
    let customer = customer_site().open("/trips.html");
    assert!(!customer.gate.require_admin("index.html"));
    assert_eq!(
        customer.navigator.last_redirect().unwrap().delay,
        Some(customer.gate.config().redirect_delay)
    );

    let admin = admin_site().open("/trips.html");
    assert!(admin.gate.require_admin("index.html"));
    assert!(admin.navigator.redirects().is_empty());
}

#[test]
fn test_require_customer_anonymous_records_page() {
    let site = Site::new();
    let page = site.open("/booking.html");
    assert!(!page.gate.require_customer("login.html"));
    assert_eq!(page.gate.intended_page().as_deref(), Some("/booking.html"));
}

// =============================================================================
// Intended page round trip
// =============================================================================

#[test]
fn test_login_returns_to_intended_page() {
    let site = Site::new();
    let blocked = site.open("/booking.html?truck=T-7");
    blocked.gate.init();

    let login = site.open("/login.html");
    assert!(login.gate.complete_login(&User::new("u1", "Ann", Role::Customer)));
    assert_eq!(login.navigator.current_location(), "/booking.html?truck=T-7");
    assert!(!site.tab.contains(keys::INTENDED_PAGE));

    let landed = site.open("/booking.html?truck=T-7");
    assert!(landed.gate.init());
}

#[test]
fn test_login_without_intended_page_lands_by_role() {
    let site = Site::new();
    let login = site.open("/login.html");
    login.gate.complete_login(&User::new("a1", "Baraka", Role::Admin));
    assert_eq!(login.navigator.current_location(), "dashboard.html");

    let site = Site::new();
    let login = site.open("/login.html");
    login.gate.complete_login(&User::new("u1", "Ann", Role::Customer));
    assert_eq!(login.navigator.current_location(), "index.html");
}
