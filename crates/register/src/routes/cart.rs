//! Cart route handlers.
//!
//! Every handler answers with the full checkout view so the till can redraw
//! from a single response.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use tillpoint_core::{Feature, ProductId};

use crate::actions;
use crate::checkout::CheckoutView;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub product_id: ProductId,
    /// Zero or below removes the line.
    pub quantity: i64,
}

#[instrument(skip(state, user))]
pub async fn show(State(state): State<AppState>, user: CurrentUser) -> Result<Json<CheckoutView>> {
    user.require(Feature::Pos)?;
    Ok(Json(state.register().await.view()))
}

#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ProductRequest>,
) -> Result<Json<CheckoutView>> {
    user.require(Feature::Pos)?;
    let mut register = state.register().await;
    if !actions::add_product(&mut *register, request.product_id)? {
        return Err(AppError::NotFound(format!("product {}", request.product_id)));
    }
    Ok(Json(register.view()))
}

#[instrument(skip(state, user))]
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<QuantityRequest>,
) -> Result<Json<CheckoutView>> {
    user.require(Feature::Pos)?;
    let mut register = state.register().await;
    actions::update_quantity(&mut *register, request.product_id, request.quantity)?;
    Ok(Json(register.view()))
}

#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ProductRequest>,
) -> Result<Json<CheckoutView>> {
    user.require(Feature::Pos)?;
    let mut register = state.register().await;
    actions::remove_product(&mut *register, request.product_id);
    Ok(Json(register.view()))
}

#[instrument(skip(state, user))]
pub async fn clear(State(state): State<AppState>, user: CurrentUser) -> Result<Json<CheckoutView>> {
    user.require(Feature::Pos)?;
    let mut register = state.register().await;
    actions::clear_cart(&mut *register);
    Ok(Json(register.view()))
}
