use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::{ProductId, StoreId};

use super::{ValidationError, require_text};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price, never negative.
    pub price: Decimal,
    pub category: String,
    /// Units on hand. Informational only, sales never check it.
    pub in_stock: u32,
    /// Store carrying the product, used for store-specific tax rates.
    pub store_id: Option<StoreId>,
    pub barcode: Option<String>,
    /// Image URL or path.
    #[serde(default)]
    pub image: String,
    pub description: Option<String>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub category: String,
    #[serde(default)]
    pub in_stock: u32,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewProduct {
    /// Check required fields and the price floor.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("category", &self.category)?;
        validate_price(self.price)
    }

    /// Build the stored product under `id`.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            category: self.category,
            in_stock: self.in_stock,
            store_id: self.store_id,
            barcode: self.barcode,
            image: self.image,
            description: self.description,
        }
    }
}

/// Partial update for a product. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub in_stock: Option<u32>,
    pub store_id: Option<StoreId>,
    pub barcode: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl ProductUpdate {
    /// Check the fields that are being changed.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(category) = &self.category {
            require_text("category", category)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Apply the changed fields to `product`.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(in_stock) = self.in_stock {
            product.in_stock = in_stock;
        }
        if self.store_id.is_some() {
            product.store_id = self.store_id;
        }
        if self.barcode.is_some() {
            product.barcode = self.barcode;
        }
        if let Some(image) = self.image {
            product.image = image;
        }
        if self.description.is_some() {
            product.description = self.description;
        }
    }
}

fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("price", "cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn coffee() -> NewProduct {
        NewProduct {
            name: "Coffee".to_string(),
            price: Decimal::new(350, 2),
            category: "Drinks".to_string(),
            in_stock: 10,
            store_id: None,
            barcode: Some("400100".to_string()),
            image: String::new(),
            description: None,
        }
    }

    #[test]
    fn test_validate_accepts_free_items() {
        let mut product = coffee();
        product.price = Decimal::ZERO;
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let mut product = coffee();
        product.price = Decimal::new(-1, 0);
        assert_eq!(product.validate().unwrap_err().field, "price");
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let mut product = coffee();
        product.name = "  ".to_string();
        assert_eq!(product.validate().unwrap_err().field, "name");
    }

    #[test]
    fn test_update_only_touches_given_fields() {
        let mut product = coffee().into_product(ProductId::new(1));
        ProductUpdate {
            price: Some(Decimal::new(375, 2)),
            ..ProductUpdate::default()
        }
        .apply(&mut product);
        assert_eq!(product.price, Decimal::new(375, 2));
        assert_eq!(product.name, "Coffee");
        assert_eq!(product.barcode.as_deref(), Some("400100"));
    }
}
