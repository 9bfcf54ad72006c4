use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::CustomerId;

use super::{ValidationError, require_text};

/// A customer in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub notes: Option<String>,
    /// Orders charged to store credit.
    pub total_orders: u32,
    /// Running store-credit balance. Not a ledger: only the sum is kept.
    pub total_spent: Decimal,
}

/// Input for creating a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewCustomer {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        validate_email(&self.email)
    }

    /// Build the stored customer under `id` with empty totals.
    #[must_use]
    pub fn into_customer(self, id: CustomerId) -> Customer {
        Customer {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            notes: self.notes,
            total_orders: 0,
            total_spent: Decimal::ZERO,
        }
    }
}

/// Partial update for a customer's contact details.
///
/// Totals are not editable here; they only move through checkout and
/// credit repayments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl CustomerUpdate {
    /// Check the fields that are being changed.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    /// Apply the changed fields to `customer`.
    pub fn apply(self, customer: &mut Customer) {
        if let Some(name) = self.name {
            customer.name = name;
        }
        if let Some(email) = self.email {
            customer.email = email;
        }
        if let Some(phone) = self.phone {
            customer.phone = phone;
        }
        if let Some(address) = self.address {
            customer.address = address;
        }
        if self.notes.is_some() {
            customer.notes = self.notes;
        }
    }
}

/// Email is optional for walk-in customers, but must look like one when given.
fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(());
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::new("email", "must look like name@domain")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn walk_in(email: &str) -> NewCustomer {
        NewCustomer {
            name: "Dana Reyes".to_string(),
            email: email.to_string(),
            phone: String::new(),
            address: String::new(),
            notes: None,
        }
    }

    #[test]
    fn test_email_optional() {
        assert!(walk_in("").validate().is_ok());
    }

    #[test]
    fn test_email_shape_checked() {
        assert!(walk_in("dana@example.com").validate().is_ok());
        assert_eq!(walk_in("dana@").validate().unwrap_err().field, "email");
        assert_eq!(walk_in("dana").validate().unwrap_err().field, "email");
    }

    #[test]
    fn test_new_customer_starts_with_zero_balance() {
        let customer = walk_in("").into_customer(CustomerId::new(3));
        assert_eq!(customer.total_spent, Decimal::ZERO);
        assert_eq!(customer.total_orders, 0);
    }
}
