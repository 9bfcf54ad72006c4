//! Customer route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument};

use tillpoint_core::{CustomerId, Feature};

use crate::error::{AppError, Result};
use crate::import::{ImportReport, import_customers};
use crate::middleware::CurrentUser;
use crate::models::{Customer, CustomerUpdate, NewCustomer};
use crate::services::record_credit_payment;
use crate::state::AppState;

#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Customer>>> {
    user.require(Feature::Customers)?;
    Ok(Json(state.catalog().list_customers()?))
}

#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Customer>> {
    user.require(Feature::Customers)?;
    let id = CustomerId::new(id);
    state
        .catalog()
        .get_customer(id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("customer {id}")))
}

#[instrument(skip(state, user, customer))]
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(customer): Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>)> {
    user.require(Feature::Customers)?;
    let customer = state.catalog().add_customer(customer)?;
    info!(customer_id = %customer.id, "Customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

#[instrument(skip(state, user, update))]
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(update): Json<CustomerUpdate>,
) -> Result<Json<Customer>> {
    user.require(Feature::Customers)?;
    let id = CustomerId::new(id);
    state
        .catalog()
        .update_customer(id, update)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("customer {id}")))
}

#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    user.require(Feature::Customers)?;
    let id = CustomerId::new(id);
    if state.catalog().delete_customer(id)? {
        info!(customer_id = %id, "Customer deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("customer {id}")))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreditPaymentRequest {
    pub amount: Decimal,
}

/// Record a repayment against the customer's store-credit balance.
#[instrument(skip(state, user, request), fields(amount = %request.amount))]
pub async fn credit_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<CreditPaymentRequest>,
) -> Result<Json<Customer>> {
    user.require(Feature::Customers)?;
    let customer = record_credit_payment(state.catalog(), CustomerId::new(id), request.amount)?;
    Ok(Json(customer))
}

/// Bulk import from a CSV request body.
#[instrument(skip(state, user, body))]
pub async fn import(
    State(state): State<AppState>,
    user: CurrentUser,
    body: String,
) -> Result<Json<ImportReport>> {
    user.require(Feature::Customers)?;
    Ok(Json(import_customers(state.catalog(), body.as_bytes())?))
}
