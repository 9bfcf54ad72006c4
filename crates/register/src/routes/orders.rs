//! Order route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use tracing::{info, instrument};

use tillpoint_core::{Feature, OrderId, OrderStatus};

use super::document_response;
use crate::documents::DocumentRequest;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::Order;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
}

/// List orders, optionally filtered by status (`in-progress` lists held carts).
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<Order>>> {
    user.require(Feature::Orders)?;
    let orders = state
        .catalog()
        .list_orders()?
        .into_iter()
        .filter(|order| query.status.is_none_or(|status| order.status == status))
        .collect();
    Ok(Json(orders))
}

fn find(state: &AppState, id: i32) -> Result<Order> {
    let id = OrderId::new(id);
    state
        .catalog()
        .get_order(id)?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Order>> {
    user.require(Feature::Orders)?;
    Ok(Json(find(&state, id)?))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// Move an order to a new status. Completed and cancelled orders are final.
#[instrument(skip(state, user))]
pub async fn update_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Order>> {
    user.require(Feature::Orders)?;
    let id = OrderId::new(id);
    let order = state
        .catalog()
        .update_order_status(id, request.status)?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    info!(order_id = %id, status = %order.status, "Order status changed");
    Ok(Json(order))
}

/// Reprint a receipt.
#[instrument(skip(state, user))]
pub async fn receipt(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Response> {
    user.require(Feature::Orders)?;
    let order = find(&state, id)?;
    let document = state.documents().render(DocumentRequest::Receipt(&order))?;
    Ok(document_response(document))
}
