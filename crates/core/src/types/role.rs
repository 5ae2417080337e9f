//! User roles.

use serde::{Deserialize, Serialize};

/// Role attached to a user record.
///
/// The site knows two roles; any other value the backend hands out is kept
/// verbatim in [`Role::Other`] so it survives a save/load cycle and simply
/// matches no permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Shipper booking and tracking loads.
    Customer,
    /// Operator managing trucks, drivers, trips and users.
    Admin,
    /// Any role this build does not know about.
    Other(String),
}

/// A record without a role is signed in but holds no privileges.
impl Default for Role {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl Role {
    /// The wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "customer" => Self::Customer,
            "admin" => Self::Admin,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "customer" => Self::Customer,
            "admin" => Self::Admin,
            _ => Self::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Customer => "customer".to_owned(),
            Role::Admin => "admin".to_owned(),
            Role::Other(name) => name,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_roles() {
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("customer"), Role::Customer);
    }

    #[test]
    fn test_role_names_are_case_sensitive() {
        assert_eq!(Role::from("Admin"), Role::Other("Admin".to_owned()));
    }

    #[test]
    fn test_unknown_role_survives_serde() {
        let role: Role = serde_json::from_str("\"dispatcher\"").unwrap();
        assert_eq!(role, Role::Other("dispatcher".to_owned()));
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"dispatcher\"");
    }

    #[test]
    fn test_display() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::Customer.to_string(), "customer");
    }
}
