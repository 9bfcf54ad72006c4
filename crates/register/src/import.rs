//! Bulk CSV import and export for products and customers.
//!
//! Imports never stop at a bad row: each row is validated on its own and
//! problems are collected in the [`ImportReport`]. Only an unreadable file or
//! an unavailable store aborts the batch.

use std::io::{Read, Write};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use tillpoint_core::{CustomerId, ProductId, StoreId};

use crate::catalog::{CatalogError, CatalogStore};
use crate::models::{CustomerUpdate, NewCustomer, NewProduct, Product, ProductUpdate};

/// Column order of product files.
pub const PRODUCT_HEADERS: [&str; 9] = [
    "id",
    "name",
    "price",
    "category",
    "in_stock",
    "store_id",
    "barcode",
    "image",
    "description",
];

/// Errors that abort an import or export.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file could not be read or written as CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The catalog rejected the batch.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A row that was skipped. `row` counts data rows from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// Outcome of one import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub added: usize,
    pub updated: usize,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    fn skip(&mut self, row: usize, message: impl Into<String>) {
        let message = message.into();
        warn!(row, %message, "Import row skipped");
        self.errors.push(RowError { row, message });
    }
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    in_stock: Option<String>,
    #[serde(default)]
    store_id: Option<String>,
    #[serde(default)]
    barcode: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomerRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    notes: Option<String>,
}

/// Treat blank cells as missing.
fn cell(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_cell<T: FromStr>(field: &str, value: Option<String>) -> Result<Option<T>, String> {
    cell(value)
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| format!("{field}: '{v}' is not a valid value"))
        })
        .transpose()
}

impl ProductRow {
    fn into_parts(self) -> Result<(Option<ProductId>, NewProduct), String> {
        let id = parse_cell::<ProductId>("id", self.id)?;
        let price = cell(Some(self.price)).ok_or_else(|| "price: is required".to_string())?;
        let price = Decimal::from_str(&price)
            .map_err(|_| format!("price: '{price}' is not a number"))?;
        let in_stock = match cell(self.in_stock) {
            None => 0,
            Some(v) => v
                .parse::<u32>()
                .map_err(|_| format!("in_stock: '{v}' must be a whole number of at least 0"))?,
        };
        let product = NewProduct {
            name: self.name.trim().to_string(),
            price,
            category: self.category.trim().to_string(),
            in_stock,
            store_id: parse_cell::<StoreId>("store_id", self.store_id)?,
            barcode: cell(self.barcode),
            image: cell(self.image).unwrap_or_default(),
            description: cell(self.description),
        };
        product.validate().map_err(|e| e.to_string())?;
        Ok((id, product))
    }
}

impl CustomerRow {
    fn into_parts(self) -> Result<(Option<CustomerId>, NewCustomer), String> {
        let id = parse_cell::<CustomerId>("id", self.id)?;
        let customer = NewCustomer {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            notes: cell(self.notes),
        };
        customer.validate().map_err(|e| e.to_string())?;
        Ok((id, customer))
    }
}

/// Split catalog failures into row problems and batch-fatal errors.
fn row_failure(error: CatalogError) -> Result<String, ImportError> {
    match error {
        CatalogError::Validation(_) | CatalogError::Conflict(_) => Ok(error.to_string()),
        other => Err(other.into()),
    }
}

/// Import products from CSV with a header row.
///
/// A row updates an existing product when its `id` matches one, or failing
/// that its `barcode`; otherwise it is added under a fresh id.
///
/// # Errors
///
/// Returns an error if the CSV headers cannot be read or the catalog is
/// unavailable. Bad rows are reported, not returned as errors.
#[instrument(skip(catalog, reader))]
pub fn import_products<R: Read>(
    catalog: &dyn CatalogStore,
    reader: R,
) -> Result<ImportReport, ImportError> {
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.headers()?;

    let mut report = ImportReport::default();
    for (index, record) in rdr.deserialize::<ProductRow>().enumerate() {
        let row = index + 1;
        let parsed = record
            .map_err(|e| e.to_string())
            .and_then(ProductRow::into_parts);
        let (id, product) = match parsed {
            Ok(parts) => parts,
            Err(message) => {
                report.skip(row, message);
                continue;
            }
        };

        let existing = match id {
            Some(id) => catalog.get_product(id)?,
            None => None,
        };
        let existing = match (existing, &product.barcode) {
            (Some(found), _) => Some(found),
            (None, Some(barcode)) => catalog.find_product_by_barcode(barcode)?,
            (None, None) => None,
        };

        let result = match existing {
            Some(found) => catalog
                .update_product(found.id, product_update(product))
                .map(|updated| updated.map(|_| false)),
            None => catalog.add_product(product).map(|_| Some(true)),
        };
        match result {
            Ok(Some(true)) => report.added += 1,
            Ok(Some(false)) => report.updated += 1,
            Ok(None) => report.skip(row, "product disappeared during import"),
            Err(e) => report.skip(row, row_failure(e)?),
        }
    }

    info!(
        added = report.added,
        updated = report.updated,
        skipped = report.errors.len(),
        "Product import finished"
    );
    Ok(report)
}

fn product_update(product: NewProduct) -> ProductUpdate {
    ProductUpdate {
        name: Some(product.name),
        price: Some(product.price),
        category: Some(product.category),
        in_stock: Some(product.in_stock),
        store_id: product.store_id,
        barcode: product.barcode,
        image: Some(product.image),
        description: product.description,
    }
}

/// Import customers from CSV with a header row.
///
/// A row updates an existing customer when its `id` matches one, or failing
/// that its `email`; otherwise it is added with zero totals. Totals are never
/// imported.
///
/// # Errors
///
/// Returns an error if the CSV headers cannot be read or the catalog is
/// unavailable. Bad rows are reported, not returned as errors.
#[instrument(skip(catalog, reader))]
pub fn import_customers<R: Read>(
    catalog: &dyn CatalogStore,
    reader: R,
) -> Result<ImportReport, ImportError> {
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.headers()?;

    let mut report = ImportReport::default();
    for (index, record) in rdr.deserialize::<CustomerRow>().enumerate() {
        let row = index + 1;
        let parsed = record
            .map_err(|e| e.to_string())
            .and_then(CustomerRow::into_parts);
        let (id, customer) = match parsed {
            Ok(parts) => parts,
            Err(message) => {
                report.skip(row, message);
                continue;
            }
        };

        let existing = match id {
            Some(id) => catalog.get_customer(id)?,
            None => None,
        };
        let existing = match existing {
            Some(found) => Some(found),
            None if !customer.email.is_empty() => catalog.find_customer_by_email(&customer.email)?,
            None => None,
        };

        let result = match existing {
            Some(found) => catalog
                .update_customer(
                    found.id,
                    CustomerUpdate {
                        name: Some(customer.name),
                        email: Some(customer.email),
                        phone: Some(customer.phone),
                        address: Some(customer.address),
                        notes: customer.notes,
                    },
                )
                .map(|updated| updated.map(|_| false)),
            None => catalog.add_customer(customer).map(|_| Some(true)),
        };
        match result {
            Ok(Some(true)) => report.added += 1,
            Ok(Some(false)) => report.updated += 1,
            Ok(None) => report.skip(row, "customer disappeared during import"),
            Err(e) => report.skip(row, row_failure(e)?),
        }
    }

    info!(
        added = report.added,
        updated = report.updated,
        skipped = report.errors.len(),
        "Customer import finished"
    );
    Ok(report)
}

/// Write `products` as CSV with [`PRODUCT_HEADERS`].
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn export_products<W: Write>(products: &[Product], writer: W) -> Result<(), ImportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(PRODUCT_HEADERS)?;
    for product in products {
        wtr.write_record([
            product.id.to_string(),
            product.name.clone(),
            product.price.to_string(),
            product.category.clone(),
            product.in_stock.to_string(),
            product.store_id.map(|s| s.to_string()).unwrap_or_default(),
            product.barcode.clone().unwrap_or_default(),
            product.image.clone(),
            product.description.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
