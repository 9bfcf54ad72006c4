//! User directory.
//!
//! Authentication lives outside the register; the register only needs to turn
//! a username into a [`User`] with a role and permissions.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::info;

use tillpoint_core::{Permissions, Role, UserId};

use crate::models::{NewUser, User};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Username is blank or malformed.
    #[error("invalid username: {0:?}")]
    InvalidUsername(String),

    /// Username already taken.
    #[error("user already exists: {0}")]
    AlreadyExists(String),

    /// The directory cannot serve requests.
    #[error("user directory unavailable: {0}")]
    Unavailable(String),
}

/// Lookup and administration of register users.
pub trait UserDirectory: Send + Sync {
    /// Create a user. Permissions default to the role's set when not given.
    ///
    /// # Errors
    ///
    /// Returns an error if the username is invalid or taken.
    fn create_user(&self, user: NewUser) -> Result<User, UserError>;

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unavailable.
    fn get_user(&self, id: UserId) -> Result<Option<User>, UserError>;

    /// Look up a user by username (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unavailable.
    fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError>;

    /// Change a user's role. Permissions are only reset when `reset_permissions` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unavailable.
    fn update_role(
        &self,
        id: UserId,
        role: Role,
        reset_permissions: bool,
    ) -> Result<Option<User>, UserError>;

    /// Replace a user's permissions.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unavailable.
    fn update_permissions(
        &self,
        id: UserId,
        permissions: Permissions,
    ) -> Result<Option<User>, UserError>;

    /// Remove a user. Returns `false` if unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unavailable.
    fn delete_user(&self, id: UserId) -> Result<bool, UserError>;

    /// All users, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unavailable.
    fn list_users(&self) -> Result<Vec<User>, UserError>;
}

/// A user directory held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryUsers {
    inner: RwLock<UsersInner>,
}

#[derive(Debug, Default)]
struct UsersInner {
    users: BTreeMap<UserId, User>,
    last_id: i32,
}

impl InMemoryUsers {
    /// An empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, UsersInner>, UserError> {
        self.inner
            .read()
            .map_err(|_| UserError::Unavailable("user lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, UsersInner>, UserError> {
        self.inner
            .write()
            .map_err(|_| UserError::Unavailable("user lock poisoned".to_string()))
    }
}

fn valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

impl UserDirectory for InMemoryUsers {
    fn create_user(&self, user: NewUser) -> Result<User, UserError> {
        let username = user.username.trim().to_lowercase();
        if !valid_username(&username) {
            return Err(UserError::InvalidUsername(user.username));
        }

        let mut inner = self.write()?;
        if inner.users.values().any(|u| u.username == username) {
            return Err(UserError::AlreadyExists(username));
        }

        inner.last_id += 1;
        let created = User {
            id: UserId::new(inner.last_id),
            permissions: user
                .permissions
                .unwrap_or_else(|| user.role.default_permissions()),
            username,
            name: user.name,
            role: user.role,
        };
        inner.users.insert(created.id, created.clone());
        info!(user_id = %created.id, username = %created.username, role = %created.role, "User created");
        Ok(created)
    }

    fn get_user(&self, id: UserId) -> Result<Option<User>, UserError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        let username = username.trim().to_lowercase();
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn update_role(
        &self,
        id: UserId,
        role: Role,
        reset_permissions: bool,
    ) -> Result<Option<User>, UserError> {
        Ok(self.write()?.users.get_mut(&id).map(|user| {
            user.role = role;
            if reset_permissions {
                user.permissions = role.default_permissions();
            }
            user.clone()
        }))
    }

    fn update_permissions(
        &self,
        id: UserId,
        permissions: Permissions,
    ) -> Result<Option<User>, UserError> {
        Ok(self.write()?.users.get_mut(&id).map(|user| {
            user.permissions = permissions;
            user.clone()
        }))
    }

    fn delete_user(&self, id: UserId) -> Result<bool, UserError> {
        Ok(self.write()?.users.remove(&id).is_some())
    }

    fn list_users(&self) -> Result<Vec<User>, UserError> {
        Ok(self.read()?.users.values().cloned().collect())
    }
}
