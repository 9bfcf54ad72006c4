//! Permission gate: may this user open that feature?

use serde::Serialize;
use tracing::debug;

use tillpoint_core::Feature;

use crate::models::User;

/// Where a user is sent when they have no permitted feature at all.
pub const LOGIN_ROUTE: &str = "/login";

/// Outcome of a permission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "access", content = "route", rename_all = "snake_case")]
pub enum Access {
    Allow,
    /// Denied; the user should be sent to this route instead.
    Redirect(&'static str),
}

/// Stateless permission checks.
pub struct PermissionGate;

impl PermissionGate {
    /// Check `user` against `feature`.
    ///
    /// A denied user is redirected to the first feature they may use, in menu
    /// order, or to [`LOGIN_ROUTE`] when there is none.
    #[must_use]
    pub fn check(user: &User, feature: Feature) -> Access {
        if user.permissions.allows(feature) {
            return Access::Allow;
        }
        let fallback = Self::default_route(user);
        debug!(username = %user.username, ?feature, fallback, "Permission denied");
        Access::Redirect(fallback)
    }

    /// The landing route for `user`.
    #[must_use]
    pub fn default_route(user: &User) -> &'static str {
        user.permissions
            .allowed()
            .next()
            .map_or(LOGIN_ROUTE, Feature::route)
    }
}

#[cfg(test)]
mod tests {
    use tillpoint_core::{Permissions, Role, UserId};

    use super::*;

    fn user(role: Role, permissions: Permissions) -> User {
        User {
            id: UserId::new(1),
            username: "sam".to_string(),
            name: "Sam".to_string(),
            role,
            permissions,
        }
    }

    #[test]
    fn test_allowed_feature() {
        let sam = user(Role::Cashier, Role::Cashier.default_permissions());
        assert_eq!(PermissionGate::check(&sam, Feature::Pos), Access::Allow);
    }

    #[test]
    fn test_denied_redirects_to_first_permitted() {
        let sam = user(Role::Cashier, Role::Cashier.default_permissions());
        assert_eq!(
            PermissionGate::check(&sam, Feature::Users),
            Access::Redirect("/")
        );

        let till_only = user(Role::Cashier, Permissions::only(&[Feature::Pos]));
        assert_eq!(
            PermissionGate::check(&till_only, Feature::Reports),
            Access::Redirect("/pos")
        );
    }

    #[test]
    fn test_no_permissions_redirects_to_login() {
        let locked = user(Role::Cashier, Permissions::none());
        assert_eq!(
            PermissionGate::check(&locked, Feature::Pos),
            Access::Redirect(LOGIN_ROUTE)
        );
    }

    #[test]
    fn test_permissions_win_over_role() {
        let manager = user(
            Role::Manager,
            Role::Manager.default_permissions().with(Feature::Reports, false),
        );
        assert_ne!(PermissionGate::check(&manager, Feature::Reports), Access::Allow);
    }

    #[test]
    fn test_cashier_feature_access() {
        let sam = user(Role::Cashier, Role::Cashier.default_permissions());
        assert_eq!(PermissionGate::check(&sam, Feature::Orders), Access::Allow);
        assert_ne!(PermissionGate::check(&sam, Feature::Settings), Access::Allow);
    }
}
