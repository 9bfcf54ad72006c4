//! Cart engine.
//!
//! Quantities are never stored at zero: setting a line to zero or below
//! removes it. Adding a product that is already in the cart increments its
//! line instead of appending a second one. Stock is not checked here.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use tillpoint_core::{Money, ProductId, StoreId, TaxRate};

use crate::catalog::{CatalogError, CatalogStore};
use crate::models::{CartItem, Product};

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: u32 = 9_999;

/// Errors from cart edits.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity is above [`MAX_QUANTITY`].
    #[error("quantity {requested} exceeds the maximum of {MAX_QUANTITY} per line")]
    QuantityTooLarge { requested: i64 },
}

/// Tax rates per store, with a register-wide fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxPolicy {
    default_rate: TaxRate,
    store_rates: BTreeMap<StoreId, TaxRate>,
}

impl TaxPolicy {
    /// A policy applying `default_rate` to every store.
    #[must_use]
    pub const fn new(default_rate: TaxRate) -> Self {
        Self {
            default_rate,
            store_rates: BTreeMap::new(),
        }
    }

    /// Override the rate for one store.
    #[must_use]
    pub fn with_store_rate(mut self, store_id: StoreId, rate: TaxRate) -> Self {
        self.store_rates.insert(store_id, rate);
        self
    }

    /// The rate that applies to `store_id`.
    #[must_use]
    pub fn rate_for(&self, store_id: Option<StoreId>) -> TaxRate {
        store_id
            .and_then(|id| self.store_rates.get(&id).copied())
            .unwrap_or(self.default_rate)
    }

    /// The fallback rate.
    #[must_use]
    pub const fn default_rate(&self) -> TaxRate {
        self.default_rate
    }
}

/// The items being rung up, in the order they were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
    tax_rate: TaxRate,
}

/// Cart contents with computed amounts, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u64,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub tax_rate: TaxRate,
    /// `total` rounded for display, e.g. `$17.59`.
    pub display_total: String,
}

impl Cart {
    /// An empty cart taxed at `tax_rate`.
    #[must_use]
    pub const fn new(tax_rate: TaxRate) -> Self {
        Self {
            items: Vec::new(),
            tax_rate,
        }
    }

    /// Add one unit of `product`. A line already at [`MAX_QUANTITY`] stays there.
    pub fn add_item(&mut self, product: Product) {
        if let Some(line) = self.line_mut(product.id) {
            if line.quantity >= MAX_QUANTITY {
                warn!(product_id = %product.id, "Cart line at maximum quantity, not incremented");
                return;
            }
            line.quantity += 1;
            debug!(product_id = %product.id, quantity = line.quantity, "Cart line incremented");
            return;
        }
        debug!(product_id = %product.id, "Cart line added");
        self.items.push(CartItem::single(product));
    }

    /// Look up `id` in the catalog and add one unit of it.
    ///
    /// An unknown id leaves the cart untouched and returns `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    pub fn add_product_by_id(
        &mut self,
        catalog: &dyn CatalogStore,
        id: ProductId,
    ) -> Result<bool, CatalogError> {
        let Some(product) = catalog.get_product(id)? else {
            warn!(product_id = %id, "Product not found, nothing added to cart");
            return Ok(false);
        };
        self.add_item(product);
        Ok(true)
    }

    /// Set the quantity of a line. Zero or below removes it; unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityTooLarge`] above [`MAX_QUANTITY`]; the
    /// cart is left unchanged.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_item(product_id);
            return Ok(());
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_QUANTITY)
            .ok_or(CartError::QuantityTooLarge {
                requested: quantity,
            })?;
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity;
        }
        Ok(())
    }

    /// Drop a line. Does nothing if the product is not in the cart.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product_id() != product_id);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Tax on the subtotal, unrounded.
    #[must_use]
    pub fn tax(&self) -> Decimal {
        self.tax_rate.apply(self.subtotal())
    }

    /// Subtotal plus tax.
    #[must_use]
    pub fn total(&self) -> Decimal {
        let subtotal = self.subtotal();
        subtotal.saturating_add(self.tax_rate.apply(subtotal))
    }

    #[must_use]
    pub const fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// A deep copy of the lines, for storing in an order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartItem> {
        self.items.clone()
    }

    /// Put previously snapshotted lines back into the cart.
    ///
    /// Lines merge with existing ones by product id; lines with a zero
    /// quantity are dropped and quantities are capped at [`MAX_QUANTITY`].
    pub fn restore(&mut self, items: Vec<CartItem>) {
        for mut item in items.into_iter().filter(|item| item.quantity > 0) {
            if let Some(line) = self.line_mut(item.product_id()) {
                line.quantity = line.quantity.saturating_add(item.quantity).min(MAX_QUANTITY);
            } else {
                item.quantity = item.quantity.min(MAX_QUANTITY);
                self.items.push(item);
            }
        }
    }

    /// The cart with computed amounts.
    #[must_use]
    pub fn view(&self) -> CartView {
        let total = self.total();
        CartView {
            items: self.snapshot(),
            item_count: self.item_count(),
            subtotal: self.subtotal(),
            tax: self.tax(),
            total,
            tax_rate: self.tax_rate,
            display_total: Money::new(total).to_string(),
        }
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_id() == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::catalog::InMemoryCatalog;
    use crate::models::NewProduct;

    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Item {id}"),
            price: Decimal::new(cents, 2),
            category: "General".to_string(),
            in_stock: 10,
            store_id: None,
            barcode: None,
            image: String::new(),
            description: None,
        }
    }

    #[test]
    fn test_totals_are_exact() {
        let mut cart = Cart::new(TaxRate::default());
        cart.add_item(product(1, 350));
        cart.add_item(product(1, 350));
        cart.add_item(product(2, 899));

        assert_eq!(cart.subtotal(), Decimal::new(1599, 2));
        assert_eq!(cart.tax(), Decimal::new(1599, 3));
        assert_eq!(cart.total(), Decimal::new(17589, 3));
        assert_eq!(cart.total(), cart.subtotal() + cart.tax());
        assert_eq!(Money::new(cart.tax()).to_string(), "$1.60");
        assert_eq!(cart.view().display_total, "$17.59");
    }

    #[test]
    fn test_add_accumulates_per_product() {
        let mut cart = Cart::new(TaxRate::default());
        cart.add_item(product(1, 100));
        cart.add_item(product(2, 100));
        cart.add_item(product(1, 100));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.items().first().unwrap().quantity, 2);
    }

    #[test]
    fn test_non_positive_quantity_removes() {
        let mut cart = Cart::new(TaxRate::default());
        cart.add_item(product(1, 100));
        cart.add_item(product(2, 100));

        cart.update_quantity(ProductId::new(1), 0).unwrap();
        cart.update_quantity(ProductId::new(2), -3).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_sets_exact_quantity() {
        let mut cart = Cart::new(TaxRate::default());
        cart.add_item(product(1, 100));
        cart.update_quantity(ProductId::new(1), 7).unwrap();
        cart.update_quantity(ProductId::new(9), 4).unwrap();

        assert_eq!(cart.item_count(), 7);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_quantity_never_zero_after_mixed_operations() {
        let mut cart = Cart::new(TaxRate::default());
        let operations: [(i32, i64); 8] = [
            (1, 3),
            (2, 0),
            (1, -1),
            (3, 2),
            (3, 1),
            (1, 5),
            (2, -9),
            (3, 0),
        ];
        for (id, quantity) in operations {
            cart.add_item(product(id, 100));
            cart.update_quantity(ProductId::new(id), quantity).unwrap();
            assert!(cart.items().iter().all(|item| item.quantity > 0));
        }
    }

    #[test]
    fn test_oversized_quantity_rejected() {
        let mut cart = Cart::new(TaxRate::default());
        cart.add_item(product(1, 100));
        cart.add_item(product(2, 100));

        assert!(matches!(
            cart.update_quantity(ProductId::new(1), 3_000_000_000),
            Err(CartError::QuantityTooLarge { .. })
        ));
        assert!(cart.update_quantity(ProductId::new(2), i64::MAX).is_err());
        assert_eq!(cart.item_count(), 2);

        cart.update_quantity(ProductId::new(1), i64::from(MAX_QUANTITY))
            .unwrap();
        cart.update_quantity(ProductId::new(2), i64::from(MAX_QUANTITY))
            .unwrap();
        cart.add_item(product(1, 100));
        let view = cart.view();
        assert_eq!(view.item_count, 2 * u64::from(MAX_QUANTITY));
        assert_eq!(view.subtotal, Decimal::new(19_998, 0));
    }

    #[test]
    fn test_huge_prices_do_not_overflow() {
        let mut cart = Cart::new(TaxRate::default());
        let mut expensive = product(1, 0);
        expensive.price = Decimal::MAX;
        cart.add_item(expensive.clone());
        cart.add_item(expensive);
        cart.add_item(product(2, 100));

        let view = cart.view();
        assert_eq!(view.subtotal, Decimal::MAX);
        assert_eq!(view.total, Decimal::MAX);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new(TaxRate::default());
        cart.add_item(product(1, 100));
        cart.remove_item(ProductId::new(5));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_add_unknown_product_id_is_silent() {
        let catalog = InMemoryCatalog::new();
        let coffee = catalog
            .add_product(NewProduct {
                name: "Coffee".to_string(),
                price: Decimal::new(350, 2),
                category: "Drinks".to_string(),
                in_stock: 10,
                store_id: None,
                barcode: None,
                image: String::new(),
                description: None,
            })
            .unwrap();

        let mut cart = Cart::new(TaxRate::default());
        assert!(!cart.add_product_by_id(&catalog, ProductId::new(42)).unwrap());
        assert!(cart.is_empty());
        assert!(cart.add_product_by_id(&catalog, coffee.id).unwrap());
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_snapshot_is_decoupled() {
        let mut cart = Cart::new(TaxRate::default());
        cart.add_item(product(1, 100));
        let snapshot = cart.snapshot();
        cart.clear();
        assert_eq!(snapshot.len(), 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_restore_merges_and_drops_zero_lines() {
        let mut cart = Cart::new(TaxRate::default());
        cart.add_item(product(1, 100));

        let mut held = CartItem::single(product(1, 100));
        held.quantity = 2;
        let mut empty = CartItem::single(product(2, 100));
        empty.quantity = 0;
        cart.restore(vec![held, empty]);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_tax_policy_store_override() {
        let eight = TaxRate::new(Decimal::new(8, 2)).unwrap();
        let policy = TaxPolicy::default().with_store_rate(StoreId::new(1), eight);

        assert_eq!(policy.rate_for(Some(StoreId::new(1))), eight);
        assert_eq!(policy.rate_for(Some(StoreId::new(2))), TaxRate::default());
        assert_eq!(policy.rate_for(None), TaxRate::default());
    }
}
