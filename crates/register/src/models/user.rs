use serde::{Deserialize, Serialize};

use tillpoint_core::{Permissions, Role, UserId};

/// A register user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub role: Role,
    /// Stored independently of `role`; may diverge from the role defaults.
    pub permissions: Permissions,
}

/// Input for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub role: Role,
    /// Explicit permissions. The role defaults apply when absent.
    #[serde(default)]
    pub permissions: Option<Permissions>,
}
