//! Load a catalog from YAML.
//!
//! ## YAML Format
//!
//! ```yaml
//! products:
//!   - name: Coffee
//!     price: "3.50"
//!     category: Drinks
//!     in_stock: 40
//!     barcode: "400100"
//! customers:
//!   - name: Dana Reyes
//!     email: dana@example.com
//! users:
//!   - username: sam
//!     name: Sam Ortiz
//!     role: cashier
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use super::{CatalogError, CatalogStore};
use crate::models::{NewCustomer, NewOrder, NewProduct, NewUser};
use crate::users::{UserDirectory, UserError};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file could not be read or written.
    #[error("failed to access {path}: {message}")]
    Io { path: String, message: String },

    /// The seed file is not valid YAML for a catalog.
    #[error("failed to parse seed YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An entry was rejected by the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A user entry was rejected by the directory.
    #[error(transparent)]
    User(#[from] UserError),
}

/// Catalog contents without ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub products: Vec<NewProduct>,
    #[serde(default)]
    pub customers: Vec<NewCustomer>,
    #[serde(default)]
    pub orders: Vec<NewOrder>,
    #[serde(default)]
    pub users: Vec<NewUser>,
}

/// Counts of seeded entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub products: usize,
    pub customers: usize,
    pub orders: usize,
    pub users: usize,
}

impl CatalogSeed {
    /// Read a seed from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SeedError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Serialize the seed as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, SeedError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Capture the current catalog contents (ids are dropped).
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    pub fn snapshot(catalog: &dyn CatalogStore) -> Result<Self, SeedError> {
        let products = catalog
            .list_products()?
            .into_iter()
            .map(|p| NewProduct {
                name: p.name,
                price: p.price,
                category: p.category,
                in_stock: p.in_stock,
                store_id: p.store_id,
                barcode: p.barcode,
                image: p.image,
                description: p.description,
            })
            .collect();
        let customers = catalog
            .list_customers()?
            .into_iter()
            .map(|c| NewCustomer {
                name: c.name,
                email: c.email,
                phone: c.phone,
                address: c.address,
                notes: c.notes,
            })
            .collect();
        let orders = catalog
            .list_orders()?
            .into_iter()
            .map(|o| NewOrder {
                customer_id: o.customer_id,
                customer_name: o.customer_name,
                items: o.items,
                date: o.date,
                subtotal: o.subtotal,
                tax: o.tax,
                total: o.total,
                payment_method: o.payment_method,
                status: o.status,
                store_id: o.store_id,
                notes: o.notes,
            })
            .collect();
        Ok(Self {
            products,
            customers,
            orders,
            users: Vec::new(),
        })
    }

    /// Insert the catalog entries into `catalog`. Users are ignored here.
    ///
    /// # Errors
    ///
    /// Stops at the first rejected entry.
    #[instrument(skip_all, fields(products = self.products.len(), customers = self.customers.len()))]
    pub fn load_into(self, catalog: &dyn CatalogStore) -> Result<SeedSummary, SeedError> {
        let mut summary = SeedSummary::default();
        for product in self.products {
            catalog.add_product(product)?;
            summary.products += 1;
        }
        for customer in self.customers {
            catalog.add_customer(customer)?;
            summary.customers += 1;
        }
        for order in self.orders {
            catalog.add_order(order)?;
            summary.orders += 1;
        }
        info!(?summary, "Catalog seeded");
        Ok(summary)
    }

    /// Insert the user entries into `users`.
    ///
    /// # Errors
    ///
    /// Stops at the first rejected user.
    pub fn load_users(&self, users: &dyn UserDirectory) -> Result<usize, SeedError> {
        for user in &self.users {
            users.create_user(user.clone())?;
        }
        Ok(self.users.len())
    }
}
