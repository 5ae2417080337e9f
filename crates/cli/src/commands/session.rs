//! Session commands: login, logout, status, permissions, remembered email.

use mizigo_core::{Email, Role, User};
use mizigo_gate::{SessionStatus, permissions};

use super::{CliError, Context, report_redirects};

/// Arguments for [`login`].
#[derive(Debug, Clone)]
pub struct LoginArgs {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub role: String,
    pub remember: bool,
}

impl LoginArgs {
    fn to_user(&self) -> Result<User, CliError> {
        let role = Role::from(self.role.trim().to_lowercase());
        let mut user = User::new(self.id.as_str(), self.first_name.as_str(), role)
            .with_last_name(self.last_name.as_str());
        if let Some(email) = &self.email {
            user = user.with_email(Email::parse(email)?);
        }
        Ok(user)
    }
}

/// Log in from the login page and follow the redirect.
///
/// # Errors
///
/// Returns `CliError` if the email is malformed or the session cannot be saved.
pub fn login(ctx: &Context, args: &LoginArgs) -> Result<(), CliError> {
    let user = args.to_user()?;
    let page = ctx.load(&ctx.config().login_page);

    if !page.gate.complete_login(&user) {
        return Err(CliError::SaveFailed(args.id.clone()));
    }
    if args.remember {
        if let Some(email) = &user.email {
            page.gate.remember_email(email);
        }
    }

    tracing::info!("Logged in as {} ({})", user.display_name(), user.role);
    report_redirects(&page.navigator);
    Ok(())
}

/// Log out.
pub fn logout(ctx: &Context) {
    let page = ctx.load(&ctx.config().home_page);
    page.gate.logout();
    report_redirects(&page.navigator);
}

/// Print the current session.
pub fn status(ctx: &Context) {
    let page = ctx.load(&ctx.config().home_page);
    match page.gate.session_status() {
        SessionStatus::Anonymous => println!("Not logged in"),
        SessionStatus::Authenticated { user, expires_at } => {
            println!("User:     {} ({})", user.display_name(), user.id);
            println!("Role:     {}", user.role);
            if let Some(email) = &user.email {
                println!("Email:    {email}");
            }
            println!("Expires:  {}", expires_at.to_rfc3339());
            if let Some(remaining) = page.gate.remaining_time() {
                println!(
                    "Remaining: {}h {:02}m",
                    remaining.num_hours(),
                    remaining.num_minutes() % 60
                );
            }
        }
    }
}

/// Print whether the current user holds `permission`.
pub fn can(ctx: &Context, permission: &str) {
    let page = ctx.load(&ctx.config().home_page);
    let verdict = if page.gate.has_permission(permission) {
        "allowed"
    } else {
        "denied"
    };
    println!("{permission}: {verdict}");
}

/// List the current user's permissions.
pub fn permissions(ctx: &Context) {
    let page = ctx.load(&ctx.config().home_page);
    let Some(user) = page.gate.current_user() else {
        println!("Not logged in");
        return;
    };
    for permission in permissions::permissions_for(&user.role) {
        println!("{permission}");
    }
}

/// Remember `email` for the login form.
///
/// # Errors
///
/// Returns `CliError::InvalidEmail` if `email` is malformed.
pub fn remember_email(ctx: &Context, email: &str) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let page = ctx.load(&ctx.config().login_page);
    if page.gate.remember_email(&email) {
        println!("Remembered {email}");
    }
    Ok(())
}

/// Print the remembered email.
pub fn show_email(ctx: &Context) {
    let page = ctx.load(&ctx.config().login_page);
    match page.gate.remembered_email() {
        Some(email) => println!("{email}"),
        None => println!("No remembered email"),
    }
}

/// Forget the remembered email.
pub fn forget_email(ctx: &Context) {
    let page = ctx.load(&ctx.config().login_page);
    page.gate.forget_remembered_email();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mizigo_gate::GateConfig;

    use super::*;

    fn context(dir: &tempfile::TempDir) -> Context {
        Context::new(GateConfig::default(), dir.path().join("session.json"))
    }

    fn ann() -> LoginArgs {
        LoginArgs {
            id: "7".to_owned(),
            first_name: "Ann".to_owned(),
            last_name: "Kimaro".to_owned(),
            email: Some("ann@example.com".to_owned()),
            role: "customer".to_owned(),
            remember: true,
        }
    }

    #[test]
    fn test_login_persists_across_page_loads() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        login(&ctx, &ann()).unwrap();

        let page = ctx.load("/profile.html");
        assert!(page.gate.is_customer());
        assert_eq!(
            page.gate.remembered_email().unwrap().as_str(),
            "ann@example.com"
        );
    }

    #[test]
    fn test_login_rejects_bad_email() {
        let dir = tempfile::tempdir().unwrap();
        let args = LoginArgs {
            email: Some("not-an-email".to_owned()),
            ..ann()
        };
        let err = login(&context(&dir), &args).unwrap_err();
        assert!(matches!(err, CliError::InvalidEmail(_)));
    }

    #[test]
    fn test_login_rejects_blank_id() {
        let dir = tempfile::tempdir().unwrap();
        let args = LoginArgs {
            id: "  ".to_owned(),
            ..ann()
        };
        let err = login(&context(&dir), &args).unwrap_err();
        assert!(matches!(err, CliError::SaveFailed(_)));
    }

    #[test]
    fn test_logout_keeps_remembered_email() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        login(&ctx, &ann()).unwrap();
        logout(&ctx);

        let page = ctx.load("/");
        assert!(!page.gate.is_logged_in());
        assert!(page.gate.remembered_email().is_some());
    }
}
