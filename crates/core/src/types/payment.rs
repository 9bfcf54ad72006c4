//! Payment method identifiers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a configured payment method (`cash`, `card`, `credit`, ...).
///
/// Identifiers are case-insensitive and stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PaymentMethodId(String);

impl PaymentMethodId {
    /// The store-credit method; charging it adds to the customer's balance.
    pub const CREDIT: &'static str = "credit";

    /// Create an identifier, normalising case and surrounding whitespace.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.trim().to_lowercase())
    }

    /// The normalised identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the store-credit method.
    #[must_use]
    pub fn is_credit(&self) -> bool {
        self.0 == Self::CREDIT
    }
}

impl From<String> for PaymentMethodId {
    fn from(id: String) -> Self {
        Self::new(&id)
    }
}

impl From<&str> for PaymentMethodId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<PaymentMethodId> for String {
    fn from(id: PaymentMethodId) -> Self {
        id.0
    }
}

impl fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A payment method offered at the register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Identifier used by clients and stored on orders.
    pub id: PaymentMethodId,
    /// Human-readable label for receipts and buttons.
    pub label: String,
}

impl PaymentMethod {
    /// Create a payment method.
    #[must_use]
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: PaymentMethodId::new(id),
            label: label.to_owned(),
        }
    }
}
