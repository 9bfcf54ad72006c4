use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::{CustomerId, OrderId, OrderStatus, PaymentMethodId, ProductId, StoreId};

use super::Product;

/// A line in a cart or an order: the product as it was when added, plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    /// Always at least one.
    pub quantity: u32,
}

impl CartItem {
    /// A new line holding a single unit of `product`.
    #[must_use]
    pub fn single(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    /// The product this line refers to.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// `price × quantity`, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// A stored order.
///
/// `items` is a snapshot taken at checkout and never follows later cart or
/// catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: Option<CustomerId>,
    pub customer_name: Option<String>,
    pub items: Vec<CartItem>,
    pub date: DateTime<Utc>,
    pub subtotal: Decimal,
    pub tax: Option<Decimal>,
    pub total: Decimal,
    pub payment_method: PaymentMethodId,
    pub status: OrderStatus,
    pub store_id: Option<StoreId>,
    pub notes: Option<String>,
}

impl Order {
    /// Units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Input for storing an order. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: Option<CustomerId>,
    pub customer_name: Option<String>,
    pub items: Vec<CartItem>,
    pub date: DateTime<Utc>,
    pub subtotal: Decimal,
    pub tax: Option<Decimal>,
    pub total: Decimal,
    pub payment_method: PaymentMethodId,
    pub status: OrderStatus,
    pub store_id: Option<StoreId>,
    pub notes: Option<String>,
}

impl NewOrder {
    /// Build the stored order under `id`.
    #[must_use]
    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            items: self.items,
            date: self.date,
            subtotal: self.subtotal,
            tax: self.tax,
            total: self.total,
            payment_method: self.payment_method,
            status: self.status,
            store_id: self.store_id,
            notes: self.notes,
        }
    }
}
