//! Sales reporting over stored orders.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use tillpoint_core::{OrderStatus, PaymentMethodId};

use crate::catalog::{CatalogError, CatalogStore};
use crate::models::Order;

/// Takings for one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodTotal {
    pub method: PaymentMethodId,
    pub orders: usize,
    pub total: Decimal,
}

/// Totals over a set of orders. Only completed orders count towards sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    pub completed_orders: usize,
    pub items_sold: u64,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub by_method: Vec<MethodTotal>,
}

/// Orders placed on `date` (UTC), ordered by id.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
#[instrument(skip(catalog))]
pub fn orders_on(catalog: &dyn CatalogStore, date: NaiveDate) -> Result<Vec<Order>, CatalogError> {
    Ok(catalog
        .list_orders()?
        .into_iter()
        .filter(|order| order.date.date_naive() == date)
        .collect())
}

/// Summarise `orders`.
#[must_use]
pub fn summarize(orders: &[Order]) -> SalesSummary {
    let mut by_method: BTreeMap<PaymentMethodId, MethodTotal> = BTreeMap::new();
    let mut summary = SalesSummary {
        completed_orders: 0,
        items_sold: 0,
        subtotal: Decimal::ZERO,
        tax: Decimal::ZERO,
        total: Decimal::ZERO,
        by_method: Vec::new(),
    };

    for order in orders.iter().filter(|o| o.status == OrderStatus::Completed) {
        summary.completed_orders += 1;
        summary.items_sold = summary.items_sold.saturating_add(order.item_count());
        summary.subtotal = summary.subtotal.saturating_add(order.subtotal);
        summary.tax = summary.tax.saturating_add(order.tax.unwrap_or_default());
        summary.total = summary.total.saturating_add(order.total);

        let entry = by_method
            .entry(order.payment_method.clone())
            .or_insert_with(|| MethodTotal {
                method: order.payment_method.clone(),
                orders: 0,
                total: Decimal::ZERO,
            });
        entry.orders += 1;
        entry.total = entry.total.saturating_add(order.total);
    }

    summary.by_method = by_method.into_values().collect();
    summary
}
