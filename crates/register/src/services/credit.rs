//! Store-credit repayments.
//!
//! Charging an order to store credit raises the customer's `total_spent`;
//! a repayment lowers it again. There is no separate ledger.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};

use tillpoint_core::{CustomerId, Money};

use crate::catalog::{CatalogError, CatalogStore};
use crate::models::Customer;

/// Errors that can occur while recording a repayment.
#[derive(Debug, Error)]
pub enum CreditError {
    /// Amount is zero or negative.
    #[error("repayment amount must be positive (got {0})")]
    NonPositiveAmount(Decimal),

    /// Customer does not exist.
    #[error("customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Amount is more than the customer owes.
    #[error("repayment of {amount} exceeds outstanding balance of {outstanding}")]
    ExceedsBalance { amount: Money, outstanding: Money },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Record a store-credit repayment of `amount` by `customer_id`.
///
/// All checks run before the customer is touched.
///
/// # Errors
///
/// Returns an error if the amount is not positive, the customer is unknown,
/// or the amount is larger than the outstanding balance.
#[instrument(skip(catalog), fields(%customer_id, %amount))]
pub fn record_credit_payment(
    catalog: &dyn CatalogStore,
    customer_id: CustomerId,
    amount: Decimal,
) -> Result<Customer, CreditError> {
    if amount <= Decimal::ZERO {
        return Err(CreditError::NonPositiveAmount(amount));
    }

    let customer = catalog
        .get_customer(customer_id)?
        .ok_or(CreditError::CustomerNotFound(customer_id))?;
    if amount > customer.total_spent {
        return Err(CreditError::ExceedsBalance {
            amount: Money::new(amount),
            outstanding: Money::new(customer.total_spent),
        });
    }

    let updated = catalog
        .adjust_customer_totals(customer_id, 0, -amount)?
        .ok_or(CreditError::CustomerNotFound(customer_id))?;
    info!(balance = %updated.total_spent, "Credit repayment recorded");
    Ok(updated)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::catalog::InMemoryCatalog;
    use crate::models::NewCustomer;

    use super::*;

    fn customer_owing(catalog: &InMemoryCatalog, owed: Decimal) -> Customer {
        let customer = catalog
            .add_customer(NewCustomer {
                name: "Dana Reyes".to_string(),
                email: "dana@example.com".to_string(),
                phone: String::new(),
                address: String::new(),
                notes: None,
            })
            .unwrap();
        catalog
            .adjust_customer_totals(customer.id, 1, owed)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_repayment_reduces_balance() {
        let catalog = InMemoryCatalog::new();
        let dana = customer_owing(&catalog, Decimal::new(2000, 2));

        let updated = record_credit_payment(&catalog, dana.id, Decimal::new(750, 2)).unwrap();
        assert_eq!(updated.total_spent, Decimal::new(1250, 2));
        assert_eq!(updated.total_orders, 1);
    }

    #[test]
    fn test_rejects_non_positive() {
        let catalog = InMemoryCatalog::new();
        let dana = customer_owing(&catalog, Decimal::new(2000, 2));

        for amount in [Decimal::ZERO, Decimal::new(-5, 0)] {
            assert!(matches!(
                record_credit_payment(&catalog, dana.id, amount),
                Err(CreditError::NonPositiveAmount(_))
            ));
        }
    }

    #[test]
    fn test_rejects_unknown_customer() {
        let catalog = InMemoryCatalog::new();
        assert!(matches!(
            record_credit_payment(&catalog, CustomerId::new(7), Decimal::ONE),
            Err(CreditError::CustomerNotFound(_))
        ));
    }

    #[test]
    fn test_rejects_overpayment_without_mutation() {
        let catalog = InMemoryCatalog::new();
        let dana = customer_owing(&catalog, Decimal::new(1000, 2));

        let err = record_credit_payment(&catalog, dana.id, Decimal::new(1001, 2)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "repayment of $10.01 exceeds outstanding balance of $10.00"
        );
        let unchanged = catalog.get_customer(dana.id).unwrap().unwrap();
        assert_eq!(unchanged.total_spent, Decimal::new(1000, 2));
    }
}
