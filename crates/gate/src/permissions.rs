//! Role-based permission table.
//!
//! Fixed at build time. Names not listed here are allowed for nobody.

use mizigo_core::Role;

const ADMIN: &[&str] = &["admin"];
const CUSTOMER_OR_ADMIN: &[&str] = &["customer", "admin"];

/// Permission name to the roles allowed to exercise it.
pub const PERMISSIONS: &[(&str, &[&str])] = &[
    ("manage_users", ADMIN),
    ("manage_trucks", ADMIN),
    ("manage_drivers", ADMIN),
    ("manage_trips", ADMIN),
    ("view_dashboard", ADMIN),
    ("view_reports", ADMIN),
    ("export_data", ADMIN),
    ("create_booking", CUSTOMER_OR_ADMIN),
    ("view_bookings", CUSTOMER_OR_ADMIN),
    ("cancel_booking", CUSTOMER_OR_ADMIN),
    ("track_shipment", CUSTOMER_OR_ADMIN),
    ("edit_profile", CUSTOMER_OR_ADMIN),
];

/// Roles allowed to exercise `permission`; empty for unknown names.
#[must_use]
pub fn allowed_roles(permission: &str) -> &'static [&'static str] {
    PERMISSIONS
        .iter()
        .find(|(name, _)| *name == permission)
        .map(|(_, roles)| *roles)
        .unwrap_or_default()
}

/// Whether `role` may exercise `permission`.
#[must_use]
pub fn role_has_permission(role: &Role, permission: &str) -> bool {
    allowed_roles(permission).contains(&role.as_str())
}

/// Every permission granted to `role`, in table order.
pub fn permissions_for(role: &Role) -> impl Iterator<Item = &'static str> + '_ {
    PERMISSIONS
        .iter()
        .filter(move |(_, roles)| roles.contains(&role.as_str()))
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manage_users_is_admin_only() {
        assert!(role_has_permission(&Role::Admin, "manage_users"));
        assert!(!role_has_permission(&Role::Customer, "manage_users"));
    }

    #[test]
    fn test_create_booking_for_both_roles() {
        assert!(role_has_permission(&Role::Admin, "create_booking"));
        assert!(role_has_permission(&Role::Customer, "create_booking"));
    }

    #[test]
    fn test_unknown_permission_fails_closed() {
        assert!(allowed_roles("launch_rockets").is_empty());
        assert!(!role_has_permission(&Role::Admin, "launch_rockets"));
    }

    #[test]
    fn test_unknown_role_has_nothing() {
        let role = Role::Other("dispatcher".to_owned());
        assert_eq!(permissions_for(&role).count(), 0);
    }

    #[test]
    fn test_customer_permissions() {
        let granted: Vec<_> = permissions_for(&Role::Customer).collect();
        assert_eq!(
            granted,
            [
                "create_booking",
                "view_bookings",
                "cancel_booking",
                "track_shipment",
                "edit_profile"
            ]
        );
    }
}
