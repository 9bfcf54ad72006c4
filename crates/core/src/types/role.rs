//! Register user roles and per-feature permissions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Register user role.
///
/// A role only decides the permission set a user starts with. Permissions are
/// stored separately and may be edited afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access including user administration.
    Admin,
    /// Store management without user administration.
    Manager,
    /// Till operation and customer lookup.
    Cashier,
}

impl Role {
    /// The permission set a freshly created user with this role receives.
    #[must_use]
    pub fn default_permissions(self) -> Permissions {
        match self {
            Self::Admin => Permissions::all(),
            Self::Manager => Permissions::all().with(Feature::Users, false),
            Self::Cashier => Permissions::only(&[
                Feature::Dashboard,
                Feature::Pos,
                Feature::Orders,
                Feature::Customers,
                Feature::Shop,
            ]),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Manager => write!(f, "manager"),
            Self::Cashier => write!(f, "cashier"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "cashier" => Ok(Self::Cashier),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// An area of the register that can be granted or denied.
///
/// Variants are listed in menu order; the first permitted feature is where a
/// user lands after a denied request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Dashboard,
    Pos,
    Products,
    Orders,
    Customers,
    Reports,
    Settings,
    Users,
    Shop,
}

impl Feature {
    /// Every feature, in menu order.
    pub const ALL: [Self; 9] = [
        Self::Dashboard,
        Self::Pos,
        Self::Products,
        Self::Orders,
        Self::Customers,
        Self::Reports,
        Self::Settings,
        Self::Users,
        Self::Shop,
    ];

    /// The route the feature lives under.
    #[must_use]
    pub const fn route(self) -> &'static str {
        match self {
            Self::Dashboard => "/",
            Self::Pos => "/pos",
            Self::Products => "/products",
            Self::Orders => "/orders",
            Self::Customers => "/customers",
            Self::Reports => "/reports",
            Self::Settings => "/settings",
            Self::Users => "/users",
            Self::Shop => "/shop",
        }
    }

    /// Find the feature owning a route path (`/orders/12` belongs to `Orders`).
    #[must_use]
    pub fn for_route(path: &str) -> Option<Self> {
        let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
        Self::ALL.into_iter().find(|feature| {
            feature.route().trim_start_matches('/') == first
        })
    }
}

/// A feature → allowed map.
///
/// Features missing from the map are denied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(BTreeMap<Feature, bool>);

impl Permissions {
    /// Every feature allowed.
    #[must_use]
    pub fn all() -> Self {
        Self(Feature::ALL.into_iter().map(|f| (f, true)).collect())
    }

    /// Every feature explicitly denied.
    #[must_use]
    pub fn none() -> Self {
        Self(Feature::ALL.into_iter().map(|f| (f, false)).collect())
    }

    /// Only the listed features allowed, the rest explicitly denied.
    #[must_use]
    pub fn only(features: &[Feature]) -> Self {
        Self(
            Feature::ALL
                .into_iter()
                .map(|f| (f, features.contains(&f)))
                .collect(),
        )
    }

    /// Builder-style override of a single feature.
    #[must_use]
    pub fn with(mut self, feature: Feature, allowed: bool) -> Self {
        self.set(feature, allowed);
        self
    }

    /// Grant or deny a single feature.
    pub fn set(&mut self, feature: Feature, allowed: bool) {
        self.0.insert(feature, allowed);
    }

    /// Whether `feature` is allowed.
    #[must_use]
    pub fn allows(&self, feature: Feature) -> bool {
        self.0.get(&feature).copied().unwrap_or(false)
    }

    /// Allowed features in menu order.
    pub fn allowed(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL.into_iter().filter(|f| self.allows(*f))
    }
}
