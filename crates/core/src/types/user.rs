//! The user record handed over by the auth API and persisted in the session.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::{Email, Role, UserId};

/// Placeholder used when a user has no usable name.
pub const ANONYMOUS_DISPLAY_NAME: &str = "User";

/// A user as returned by `POST /auth/login` / `POST /auth/register`.
///
/// Field names follow the API's camelCase JSON. Fields this type does not
/// model are kept in `extra` so that a save/load cycle is lossless and page
/// slots such as `data-user="createdAt"` can still be filled.
///
/// `Debug` redacts the access token.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier; empty when the record carried none.
    #[serde(default)]
    pub id: UserId,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Contact address. Malformed values are dropped on load.
    #[serde(
        default,
        deserialize_with = "lenient_email",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<Email>,
    /// Authorization role. Missing roles default to an unprivileged
    /// [`Role::Other`].
    #[serde(default)]
    pub role: Role,
    /// Opaque token issued by the auth API, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Phone number collected at registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Company name collected at registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Any other fields returned by the API.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl User {
    /// Create a user with the given id, first name and role.
    #[must_use]
    pub fn new(id: impl Into<UserId>, first_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: String::new(),
            email: None,
            role,
            token: None,
            phone: None,
            company: None,
            extra: BTreeMap::new(),
        }
    }

    /// Builder method to set the family name.
    #[must_use]
    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = last_name.into();
        self
    }

    /// Builder method to set the email address.
    #[must_use]
    pub fn with_email(mut self, email: Email) -> Self {
        self.email = Some(email);
        self
    }

    /// Builder method to set the access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// "First Last", trimmed. `None` when both parts are blank.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        (!full.is_empty()).then(|| full.to_owned())
    }

    /// Name to greet the user with: full name, else first name, else a placeholder.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.full_name()
            .unwrap_or_else(|| ANONYMOUS_DISPLAY_NAME.to_owned())
    }

    /// Whether the role is [`Role::Admin`].
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the role is [`Role::Customer`].
    #[must_use]
    pub fn is_customer(&self) -> bool {
        self.role == Role::Customer
    }

    /// Look up a field by its JSON name for display purposes.
    ///
    /// Known fields are rendered as plain text; unknown fields come from
    /// `extra`, with strings unquoted and other JSON values rendered
    /// compactly. The token is never exposed through this lookup.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "firstName" => Some(self.first_name.clone()),
            "lastName" => Some(self.last_name.clone()),
            "fullName" | "name" => self.full_name(),
            "email" => self.email.as_ref().map(ToString::to_string),
            "role" => Some(self.role.to_string()),
            "phone" => self.phone.clone(),
            "company" => self.company.clone(),
            "token" => None,
            other => self.extra.get(other).map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                v => v.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("phone", &self.phone)
            .field("company", &self.company)
            .field("extra", &self.extra)
            .finish()
    }
}

/// Accept a missing, null, or malformed email as `None`.
fn lenient_email<'de, D>(deserializer: D) -> Result<Option<Email>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| Email::parse(&s).ok()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_role_is_unprivileged() {
        let user: User = serde_json::from_str(r#"{"id":"u1","firstName":"Ann"}"#).unwrap();
        assert_eq!(user.role, Role::Other(String::new()));
        assert!(!user.is_customer());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_minimal_record_parses() {
        let user: User =
            serde_json::from_str(r#"{"id":"u1","firstName":"Ann","role":"customer"}"#).unwrap();
        assert_eq!(user.id.as_str(), "u1");
        assert_eq!(user.first_name, "Ann");
        assert!(user.last_name.is_empty());
        assert!(user.email.is_none());
        assert!(user.is_customer());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_missing_id_parses_as_empty() {
        let user: User = serde_json::from_str(r#"{"firstName":"Ann","role":"admin"}"#).unwrap();
        assert!(user.id.is_empty());
    }

    #[test]
    fn test_malformed_email_is_dropped() {
        let user: User =
            serde_json::from_str(r#"{"id":1,"role":"customer","email":"nope"}"#).unwrap();
        assert!(user.email.is_none());
        assert_eq!(user.id.as_str(), "1");
    }

    #[test]
    fn test_extra_fields_round_trip() {
        let json = r#"{"id":"u2","firstName":"Baraka","lastName":"Mushi","role":"admin","createdAt":"2024-05-01","depot":{"city":"Dar"}}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.field("createdAt").as_deref(), Some("2024-05-01"));
        assert_eq!(user.field("depot").as_deref(), Some(r#"{"city":"Dar"}"#));

        let back: User = serde_json::from_str(&serde_json::to_string(&user).unwrap()).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let user = User::new("u1", "Ann", Role::Customer).with_last_name("Kimaro");
        assert_eq!(user.display_name(), "Ann Kimaro");

        let user = User::new("u1", "Ann", Role::Customer);
        assert_eq!(user.display_name(), "Ann");

        let user = User::new("u1", "  ", Role::Customer);
        assert_eq!(user.display_name(), ANONYMOUS_DISPLAY_NAME);
    }

    #[test]
    fn test_token_is_hidden() {
        let user = User::new("u1", "Ann", Role::Customer).with_token("sekrit-token");
        assert!(!format!("{user:?}").contains("sekrit-token"));
        assert!(format!("{user:?}").contains("[REDACTED]"));
        assert_eq!(user.field("token"), None);
    }
}
