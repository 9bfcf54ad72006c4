//! Acting-user extractor and permission checks.
//!
//! The register runs on a trusted till: the client names the signed-in user in
//! the `x-register-user` header and every handler checks that user's
//! permissions for the feature it serves.

use axum::{extract::FromRequestParts, http::request::Parts};

use tillpoint_core::Feature;

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::permissions::{Access, PermissionGate};
use crate::state::AppState;

/// Header carrying the username of the acting user.
pub const USER_HEADER: &str = "x-register-user";

/// Extractor that requires a known register user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(user: CurrentUser) -> Result<Json<Value>> {
///     user.require(Feature::Orders)?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Fail with `403` unless the user may open `feature`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] carrying the user's landing route.
    pub fn require(&self, feature: Feature) -> Result<(), AppError> {
        match PermissionGate::check(&self.0, feature) {
            Access::Allow => Ok(()),
            Access::Redirect(redirect) => Err(AppError::Forbidden {
                message: format!("{} may not use {}", self.0.username, feature.route()),
                redirect,
            }),
        }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.0
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized("No register user".to_string()))?;

        let user = state
            .users()
            .find_by_username(username)?
            .ok_or_else(|| AppError::Unauthorized(format!("Unknown user {username}")))?;

        set_sentry_user(user.id.as_i32(), &user.username);
        Ok(Self(user))
    }
}
