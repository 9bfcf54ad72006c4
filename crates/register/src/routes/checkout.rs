//! Checkout route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use tillpoint_core::{CustomerId, Feature, OrderId, PaymentMethodId};

use crate::actions::{self, PosIntent};
use crate::checkout::{CheckoutOutcome, CheckoutView};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::Order;
use crate::state::AppState;

/// Run an intent and return the new checkout view.
async fn run(state: &AppState, intent: PosIntent) -> Result<Json<CheckoutView>> {
    let mut register = state.register().await;
    actions::apply(&mut *register, intent).await?;
    Ok(Json(register.view()))
}

#[instrument(skip(state, user))]
pub async fn begin(State(state): State<AppState>, user: CurrentUser) -> Result<Json<CheckoutView>> {
    user.require(Feature::Pos)?;
    run(&state, PosIntent::BeginCheckout).await
}

#[derive(Debug, Deserialize)]
pub struct PaymentMethodRequest {
    pub method: PaymentMethodId,
}

#[instrument(skip(state, user))]
pub async fn payment_method(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<PaymentMethodRequest>,
) -> Result<Json<CheckoutView>> {
    user.require(Feature::Pos)?;
    run(
        &state,
        PosIntent::SelectPaymentMethod {
            method: request.method,
        },
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    /// `null` checks out as guest.
    pub customer_id: Option<CustomerId>,
}

#[instrument(skip(state, user))]
pub async fn customer(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CustomerRequest>,
) -> Result<Json<CheckoutView>> {
    user.require(Feature::Pos)?;
    let mut register = state.register().await;
    actions::select_customer(&mut *register, request.customer_id)?;
    Ok(Json(register.view()))
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub outcome: CheckoutOutcome,
    pub checkout: CheckoutView,
}

/// Settle the payment and complete the sale.
///
/// Holds the register for the whole settlement; `/abort` interrupts it.
#[instrument(skip(state, user))]
pub async fn confirm(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ConfirmResponse>> {
    user.require(Feature::Pos)?;
    let mut register = state.register().await;
    let outcome = register.confirm_payment().await?;
    Ok(Json(ConfirmResponse {
        outcome,
        checkout: register.view(),
    }))
}

#[instrument(skip(state, user))]
pub async fn cancel(State(state): State<AppState>, user: CurrentUser) -> Result<Json<CheckoutView>> {
    user.require(Feature::Pos)?;
    run(&state, PosIntent::CancelCheckout).await
}

/// Abort the settlement in flight, if any.
#[instrument(skip(state, user))]
pub async fn abort(State(state): State<AppState>, user: CurrentUser) -> Result<StatusCode> {
    user.require(Feature::Pos)?;
    state.abort().abort();
    info!("Settlement abort requested");
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Default, Deserialize)]
pub struct HoldRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HoldResponse {
    pub order: Order,
    pub checkout: CheckoutView,
}

/// Park the cart as an in-progress order.
#[instrument(skip(state, user, request))]
pub async fn hold(
    State(state): State<AppState>,
    user: CurrentUser,
    request: Option<Json<HoldRequest>>,
) -> Result<Json<HoldResponse>> {
    user.require(Feature::Pos)?;
    let notes = request.and_then(|Json(r)| r.notes);
    let mut register = state.register().await;
    let order = register.hold_order(notes)?;
    Ok(Json(HoldResponse {
        order,
        checkout: register.view(),
    }))
}

#[instrument(skip(state, user))]
pub async fn resume(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(order_id): Path<i32>,
) -> Result<Json<CheckoutView>> {
    user.require(Feature::Pos)?;
    let mut register = state.register().await;
    actions::resume_order(&mut *register, OrderId::new(order_id))?;
    Ok(Json(register.view()))
}
