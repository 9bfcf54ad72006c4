//! Register actions shared by the HTTP handlers and voice commands.
//!
//! Every button on the till maps to one function here. Voice commands carry a
//! [`PosIntent`] naming one of them, and [`apply`] runs it.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use tillpoint_core::{CustomerId, Feature, OrderId, PaymentMethodId, ProductId};

use crate::checkout::{CheckoutError, CheckoutOutcome, CheckoutView, Register};
use crate::models::Order;
use crate::payment::PaymentGateway;

/// Something the user asked the register to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum PosIntent {
    Navigate { feature: Feature },
    Logout,
    AddProduct { product_id: ProductId },
    RemoveProduct { product_id: ProductId },
    ClearCart,
    BeginCheckout,
    SelectPaymentMethod { method: PaymentMethodId },
    ConfirmPayment,
    CancelCheckout,
    HoldOrder,
}

/// The visible result of an action.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ActionEffect {
    /// The client should show this route.
    Navigate { route: &'static str },
    /// The client should end the session.
    Logout,
    /// Cart or checkout changed.
    Checkout { checkout: CheckoutView },
    /// A sale was completed.
    Completed {
        outcome: Box<CheckoutOutcome>,
        checkout: CheckoutView,
    },
    /// The cart was parked.
    Held { order: Order, checkout: CheckoutView },
}

/// Run `intent` against `register`.
///
/// # Errors
///
/// Returns whatever error the underlying action returns.
#[instrument(skip(register))]
pub async fn apply<G: PaymentGateway>(
    register: &mut Register<G>,
    intent: PosIntent,
) -> Result<ActionEffect, CheckoutError> {
    match intent {
        PosIntent::Navigate { feature } => Ok(ActionEffect::Navigate {
            route: feature.route(),
        }),
        PosIntent::Logout => Ok(ActionEffect::Logout),
        PosIntent::AddProduct { product_id } => {
            add_product(register, product_id)?;
            Ok(checkout_effect(register))
        }
        PosIntent::RemoveProduct { product_id } => {
            remove_product(register, product_id);
            Ok(checkout_effect(register))
        }
        PosIntent::ClearCart => {
            clear_cart(register);
            Ok(checkout_effect(register))
        }
        PosIntent::BeginCheckout => {
            register.begin_checkout()?;
            Ok(checkout_effect(register))
        }
        PosIntent::SelectPaymentMethod { method } => {
            register.select_payment_method(method)?;
            Ok(checkout_effect(register))
        }
        PosIntent::ConfirmPayment => {
            let outcome = register.confirm_payment().await?;
            Ok(ActionEffect::Completed {
                outcome: Box::new(outcome),
                checkout: register.view(),
            })
        }
        PosIntent::CancelCheckout => {
            register.cancel_checkout()?;
            Ok(checkout_effect(register))
        }
        PosIntent::HoldOrder => {
            let order = register.hold_order(None)?;
            Ok(ActionEffect::Held {
                order,
                checkout: register.view(),
            })
        }
    }
}

fn checkout_effect<G: PaymentGateway>(register: &Register<G>) -> ActionEffect {
    ActionEffect::Checkout {
        checkout: register.view(),
    }
}

/// Add one unit of a catalog product. Returns `false` if the product is unknown.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub fn add_product<G: PaymentGateway>(
    register: &mut Register<G>,
    product_id: ProductId,
) -> Result<bool, CheckoutError> {
    Ok(register.add_product(product_id)?)
}

/// Set a line's quantity; zero or below removes it.
///
/// # Errors
///
/// Returns an error if the quantity is above the per-line maximum.
pub fn update_quantity<G: PaymentGateway>(
    register: &mut Register<G>,
    product_id: ProductId,
    quantity: i64,
) -> Result<(), CheckoutError> {
    Ok(register.cart_mut().update_quantity(product_id, quantity)?)
}

pub fn remove_product<G: PaymentGateway>(register: &mut Register<G>, product_id: ProductId) {
    register.cart_mut().remove_item(product_id);
}

pub fn clear_cart<G: PaymentGateway>(register: &mut Register<G>) {
    register.cart_mut().clear();
}

/// Attach a customer (or none) to the sale.
///
/// # Errors
///
/// Returns an error if the customer is unknown.
pub fn select_customer<G: PaymentGateway>(
    register: &mut Register<G>,
    customer_id: Option<CustomerId>,
) -> Result<(), CheckoutError> {
    register.select_customer(customer_id)
}

/// Resume a held order into the empty cart.
///
/// # Errors
///
/// Returns an error if the order cannot be resumed.
pub fn resume_order<G: PaymentGateway>(
    register: &mut Register<G>,
    order_id: OrderId,
) -> Result<(), CheckoutError> {
    register.resume_order(order_id)
}
