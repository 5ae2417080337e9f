//! Protected-page table and location normalisation.
//!
//! Pages are matched on their normalised path (see [`normalize_path`]) and by
//! trailing path segments, so `/track.html`, `/track`, `track.html?id=9` and
//! `/site/track.html` all hit the `track` rule.

use url::Url;

/// What a visitor must be to view a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// Any valid session.
    LoggedIn,
    /// A session whose user has the admin role.
    Admin,
    /// A session whose user has the customer role.
    Customer,
}

impl Requirement {
    /// Message shown when an interactive check fails.
    #[must_use]
    pub const fn denial_message(self) -> &'static str {
        match self {
            Self::LoggedIn => "Please log in to access this page.",
            Self::Admin => "Access denied. Administrator privileges required.",
            Self::Customer => "This page is only available to customer accounts.",
        }
    }
}

/// Symbolic redirect destination, resolved against [`crate::GateConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectTarget {
    /// The login page.
    Login,
    /// The site root.
    Home,
}

/// One protected page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRule {
    /// Normalised path, e.g. `/track`.
    pub path: &'static str,
    /// Access requirement.
    pub requirement: Requirement,
    /// Where to send visitors who fail the requirement.
    pub redirect: RedirectTarget,
}

/// The protected pages. More specific paths come first.
pub const PROTECTED_PAGES: &[PageRule] = &[
    PageRule {
        path: "/admin/dashboard",
        requirement: Requirement::Admin,
        redirect: RedirectTarget::Home,
    },
    PageRule {
        path: "/dashboard",
        requirement: Requirement::Admin,
        redirect: RedirectTarget::Home,
    },
    PageRule {
        path: "/track",
        requirement: Requirement::LoggedIn,
        redirect: RedirectTarget::Login,
    },
    PageRule {
        path: "/booking",
        requirement: Requirement::LoggedIn,
        redirect: RedirectTarget::Login,
    },
    PageRule {
        path: "/profile",
        requirement: Requirement::LoggedIn,
        redirect: RedirectTarget::Login,
    },
];

/// Reduce a location (absolute URL, path, or bare file name) to a canonical path.
///
/// Query and fragment are dropped, a leading `/` is ensured, a trailing `/`
/// and `.html` suffix are removed, and the result is lower-cased. Any form of
/// the index page becomes `/`.
#[must_use]
pub fn normalize_path(location: &str) -> String {
    let location = location.trim();
    let path = Url::parse(location).map_or_else(
        |_| {
            location
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_owned()
        },
        |url| url.path().to_owned(),
    );

    let mut path = path.to_lowercase();
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    if let Some(stripped) = path.strip_suffix(".html") {
        path = stripped.to_owned();
    }
    if path == "/index" {
        return "/".to_owned();
    }
    path
}

/// Rule protecting `location`, if any.
///
/// Rule paths start with `/`, so a suffix match always lands on a segment
/// boundary: `/site/track` matches `/track`, `/mytrack` does not.
#[must_use]
pub fn rule_for(location: &str) -> Option<&'static PageRule> {
    let path = normalize_path(location);
    PROTECTED_PAGES
        .iter()
        .find(|rule| path.ends_with(rule.path))
}

/// Whether two locations point at the same page.
#[must_use]
pub fn same_page(a: &str, b: &str) -> bool {
    normalize_path(a) == normalize_path(b)
}
