//! In-memory catalog store.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;

use tillpoint_core::{CustomerId, OrderId, OrderStatus, ProductId};

use super::{CatalogError, CatalogStore};
use crate::models::{
    Customer, CustomerUpdate, NewCustomer, NewOrder, NewProduct, Order, Product, ProductUpdate,
};

/// A catalog held in process memory.
///
/// Ids are assigned sequentially per entity, starting at 1, and are never reused.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    data: RwLock<CatalogData>,
}

#[derive(Debug, Default)]
struct CatalogData {
    products: BTreeMap<ProductId, Product>,
    customers: BTreeMap<CustomerId, Customer>,
    orders: BTreeMap<OrderId, Order>,
    last_product_id: i32,
    last_customer_id: i32,
    last_order_id: i32,
}

impl InMemoryCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogData>, CatalogError> {
        self.data
            .read()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CatalogData>, CatalogError> {
        self.data
            .write()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))
    }
}

fn barcode_taken(data: &CatalogData, barcode: Option<&str>, except: Option<ProductId>) -> bool {
    let Some(barcode) = barcode.map(str::trim).filter(|b| !b.is_empty()) else {
        return false;
    };
    data.products.values().any(|p| {
        Some(p.id) != except && p.barcode.as_deref().map(str::trim) == Some(barcode)
    })
}

impl CatalogStore for InMemoryCatalog {
    fn add_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        product.validate()?;
        let mut data = self.write()?;
        if barcode_taken(&data, product.barcode.as_deref(), None) {
            return Err(CatalogError::Conflict(format!(
                "barcode {} already in use",
                product.barcode.unwrap_or_default()
            )));
        }
        data.last_product_id += 1;
        let stored = product.into_product(ProductId::new(data.last_product_id));
        data.products.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    fn find_product_by_barcode(&self, barcode: &str) -> Result<Option<Product>, CatalogError> {
        let barcode = barcode.trim();
        Ok(self
            .read()?
            .products
            .values()
            .find(|p| p.barcode.as_deref().map(str::trim) == Some(barcode))
            .cloned())
    }

    fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, CatalogError> {
        update.validate()?;
        let mut data = self.write()?;
        if !data.products.contains_key(&id) {
            return Ok(None);
        }
        if barcode_taken(&data, update.barcode.as_deref(), Some(id)) {
            return Err(CatalogError::Conflict(format!(
                "barcode {} already in use",
                update.barcode.unwrap_or_default()
            )));
        }
        Ok(data.products.get_mut(&id).map(|product| {
            update.apply(product);
            product.clone()
        }))
    }

    fn delete_product(&self, id: ProductId) -> Result<bool, CatalogError> {
        Ok(self.write()?.products.remove(&id).is_some())
    }

    fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.read()?.products.values().cloned().collect())
    }

    fn add_customer(&self, customer: NewCustomer) -> Result<Customer, CatalogError> {
        customer.validate()?;
        let mut data = self.write()?;
        data.last_customer_id += 1;
        let stored = customer.into_customer(CustomerId::new(data.last_customer_id));
        data.customers.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, CatalogError> {
        Ok(self.read()?.customers.get(&id).cloned())
    }

    fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CatalogError> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(None);
        }
        Ok(self
            .read()?
            .customers
            .values()
            .find(|c| c.email.trim().eq_ignore_ascii_case(email))
            .cloned())
    }

    fn update_customer(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Option<Customer>, CatalogError> {
        update.validate()?;
        Ok(self.write()?.customers.get_mut(&id).map(|customer| {
            update.apply(customer);
            customer.clone()
        }))
    }

    fn adjust_customer_totals(
        &self,
        id: CustomerId,
        added_orders: u32,
        spent_delta: Decimal,
    ) -> Result<Option<Customer>, CatalogError> {
        Ok(self.write()?.customers.get_mut(&id).map(|customer| {
            customer.total_orders = customer.total_orders.saturating_add(added_orders);
            customer.total_spent = (customer.total_spent + spent_delta).max(Decimal::ZERO);
            customer.clone()
        }))
    }

    fn delete_customer(&self, id: CustomerId) -> Result<bool, CatalogError> {
        Ok(self.write()?.customers.remove(&id).is_some())
    }

    fn list_customers(&self) -> Result<Vec<Customer>, CatalogError> {
        Ok(self.read()?.customers.values().cloned().collect())
    }

    fn add_order(&self, order: NewOrder) -> Result<Order, CatalogError> {
        let mut data = self.write()?;
        data.last_order_id += 1;
        let stored = order.into_order(OrderId::new(data.last_order_id));
        data.orders.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn get_order(&self, id: OrderId) -> Result<Option<Order>, CatalogError> {
        Ok(self.read()?.orders.get(&id).cloned())
    }

    fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, CatalogError> {
        let mut data = self.write()?;
        let Some(order) = data.orders.get_mut(&id) else {
            return Ok(None);
        };
        if order.status != status && !order.status.can_transition_to(status) {
            return Err(CatalogError::InvalidTransition {
                id,
                from: order.status,
                to: status,
            });
        }
        order.status = status;
        Ok(Some(order.clone()))
    }

    fn delete_order(&self, id: OrderId) -> Result<bool, CatalogError> {
        Ok(self.write()?.orders.remove(&id).is_some())
    }

    fn list_orders(&self) -> Result<Vec<Order>, CatalogError> {
        Ok(self.read()?.orders.values().cloned().collect())
    }
}
