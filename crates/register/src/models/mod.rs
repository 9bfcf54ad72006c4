//! Domain models for the register.

mod customer;
mod order;
mod product;
mod user;

pub use customer::{Customer, CustomerUpdate, NewCustomer};
pub use order::{CartItem, NewOrder, Order};
pub use product::{NewProduct, Product, ProductUpdate};
pub use user::{NewUser, User};

/// A model failed field validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Reject blank required text.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(())
}
