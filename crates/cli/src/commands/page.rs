//! Page-load simulation.

use super::{Context, report_redirects};

/// Load `location` the way a browser would: run the gate's page-load entry
/// point and print what the visitor would see.
pub fn visit(ctx: &Context, location: &str) {
    let page = ctx.load(location);
    let allowed = page.gate.init();

    if allowed {
        println!("{location}: allowed");
    } else {
        println!("{location}: blocked");
    }
    if let Some(navbar) = page.surface.navbar() {
        let mut items = Vec::new();
        if navbar.show_login {
            items.push("login");
        }
        if navbar.show_signup {
            items.push("signup");
        }
        if navbar.show_admin_link {
            items.push("dashboard");
        }
        if navbar.show_logout {
            items.push("logout");
        }
        println!("Navbar: [{}]", items.join(", "));
        if let Some(greeting) = navbar.greeting {
            println!("{greeting}");
        }
    }
    if let Some(intended) = page.gate.intended_page() {
        tracing::info!("Will return to {intended} after login");
    }
    report_redirects(&page.navigator);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mizigo_core::{Role, User};
    use mizigo_gate::{GateConfig, Navigator};

    use super::*;

    #[test]
    fn test_blocked_visit_is_remembered_for_login() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(GateConfig::default(), dir.path().join("session.json"));

        visit(&ctx, "/booking.html");

        let login = ctx.load("login.html");
        assert!(login.gate.complete_login(&User::new("7", "Ann", Role::Customer)));
        assert_eq!(login.navigator.current_location(), "/booking.html");
    }

    #[test]
    fn test_customer_visiting_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(GateConfig::default(), dir.path().join("session.json"));
        ctx.load("login.html")
            .gate
            .save_session(&User::new("7", "Ann", Role::Customer));

        let page = ctx.load("/dashboard.html");
        assert!(!page.gate.init());
        assert_eq!(page.navigator.current_location(), "index.html");
        // Signed in: nothing recorded for a later login.
        assert!(page.gate.intended_page().is_none());
    }
}
