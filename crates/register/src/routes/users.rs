//! User administration route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use tillpoint_core::{Feature, Permissions, Role, UserId};

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{NewUser, User};
use crate::permissions::PermissionGate;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub user: User,
    /// Where the client should land.
    pub landing: &'static str,
    pub features: Vec<Feature>,
}

/// The acting user and what they may open.
#[instrument(skip(user))]
pub async fn session(user: CurrentUser) -> Json<SessionInfo> {
    let CurrentUser(user) = user;
    let landing = PermissionGate::default_route(&user);
    let features = user.permissions.allowed().collect();
    Json(SessionInfo {
        user,
        landing,
        features,
    })
}

#[instrument(skip(state, user))]
pub async fn index(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<User>>> {
    user.require(Feature::Users)?;
    Ok(Json(state.users().list_users()?))
}

#[instrument(skip(state, user, new_user), fields(username = %new_user.username))]
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    user.require(Feature::Users)?;
    let created = state.users().create_user(new_user)?;
    info!(user_id = %created.id, role = %created.role, "User created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
    /// Also replace the permissions with the new role's defaults.
    #[serde(default)]
    pub reset_permissions: bool,
}

#[instrument(skip(state, user))]
pub async fn update_role(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<User>> {
    user.require(Feature::Users)?;
    let id = UserId::new(id);
    state
        .users()
        .update_role(id, request.role, request.reset_permissions)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))
}

#[instrument(skip(state, user))]
pub async fn update_permissions(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(permissions): Json<Permissions>,
) -> Result<Json<User>> {
    user.require(Feature::Users)?;
    let id = UserId::new(id);
    state
        .users()
        .update_permissions(id, permissions)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))
}

#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    user.require(Feature::Users)?;
    let id = UserId::new(id);
    if id == user.user().id {
        return Err(AppError::BadRequest("cannot delete the acting user".to_string()));
    }
    if state.users().delete_user(id)? {
        info!(user_id = %id, "User deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("user {id}")))
    }
}
