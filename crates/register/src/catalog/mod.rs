//! Catalog store: products, customers and orders.
//!
//! The register never reaches for global collections. A [`CatalogStore`] is
//! built once and injected into whatever needs it, so each session or test
//! works against its own instance.
//!
//! Lookups return `Ok(None)` / `Ok(false)` for unknown ids; errors are reserved
//! for invalid input and backend failures. There are no transactions and no
//! referential integrity: deleting a product that sits in a cart or an order is
//! allowed.

mod memory;
pub mod seed;

use rust_decimal::Decimal;
use thiserror::Error;

use tillpoint_core::{CustomerId, OrderId, OrderStatus, ProductId};

use crate::models::{
    Customer, CustomerUpdate, NewCustomer, NewOrder, NewProduct, Order, Product, ProductUpdate,
    ValidationError,
};

pub use memory::InMemoryCatalog;
pub use seed::CatalogSeed;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input failed field validation.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Constraint violation (e.g., duplicate barcode).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The requested status change is not allowed.
    #[error("order {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The backing store cannot serve requests.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// CRUD access to products, customers and orders.
pub trait CatalogStore: Send + Sync {
    /// Store a new product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is invalid or its barcode is taken.
    fn add_product(&self, product: NewProduct) -> Result<Product, CatalogError>;

    /// Look up a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError>;

    /// Look up a product by barcode.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn find_product_by_barcode(&self, barcode: &str) -> Result<Option<Product>, CatalogError>;

    /// Change a product. Returns `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is invalid.
    fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, CatalogError>;

    /// Remove a product. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn delete_product(&self, id: ProductId) -> Result<bool, CatalogError>;

    /// All products, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn list_products(&self) -> Result<Vec<Product>, CatalogError>;

    /// Store a new customer with zero totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer is invalid.
    fn add_customer(&self, customer: NewCustomer) -> Result<Customer, CatalogError>;

    /// Look up a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, CatalogError>;

    /// Look up a customer by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CatalogError>;

    /// Change a customer's contact details. Returns `None` if unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is invalid.
    fn update_customer(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Option<Customer>, CatalogError>;

    /// Add to a customer's order count and spend balance. Returns `None` if unknown.
    ///
    /// `spent_delta` may be negative (repayments); the balance never drops
    /// below zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn adjust_customer_totals(
        &self,
        id: CustomerId,
        added_orders: u32,
        spent_delta: Decimal,
    ) -> Result<Option<Customer>, CatalogError>;

    /// Remove a customer. Returns `false` if unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn delete_customer(&self, id: CustomerId) -> Result<bool, CatalogError>;

    /// All customers, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn list_customers(&self) -> Result<Vec<Customer>, CatalogError>;

    /// Store a new order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn add_order(&self, order: NewOrder) -> Result<Order, CatalogError>;

    /// Look up an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn get_order(&self, id: OrderId) -> Result<Option<Order>, CatalogError>;

    /// Move an order to `status`. Returns `None` if unknown.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidTransition`] for disallowed moves.
    fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, CatalogError>;

    /// Remove an order. Returns `false` if unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn delete_order(&self, id: OrderId) -> Result<bool, CatalogError>;

    /// All orders, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    fn list_orders(&self) -> Result<Vec<Order>, CatalogError>;
}
