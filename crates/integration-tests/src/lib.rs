//! Integration tests for Tillpoint.
//!
//! The register runs in-process: tests build an [`AppState`] over a fresh
//! in-memory catalog and drive either the library directly or the router
//! through `tower::ServiceExt::oneshot`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tillpoint-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use tillpoint_core::Role;
use tillpoint_register::catalog::{CatalogStore, InMemoryCatalog};
use tillpoint_register::config::RegisterConfig;
use tillpoint_register::middleware::USER_HEADER;
use tillpoint_register::models::{NewCustomer, NewProduct, NewUser};
use tillpoint_register::state::AppState;
use tillpoint_register::users::{InMemoryUsers, UserDirectory};

/// Username of the seeded administrator.
pub const ADMIN: &str = "ada";
/// Username of the seeded cashier.
pub const CASHIER: &str = "sam";

/// A register over a small catalog.
///
/// Products: 1 Coffee $3.50, 2 Sandwich $8.99, 3 Home Fries $4.25.
/// Customers: 1 Dana Reyes.
pub struct TestContext {
    pub state: AppState,
    pub catalog: Arc<InMemoryCatalog>,
}

fn product(name: &str, cents: i64, category: &str, barcode: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price: Decimal::new(cents, 2),
        category: category.to_string(),
        in_stock: 20,
        store_id: None,
        barcode: Some(barcode.to_string()),
        image: String::new(),
        description: None,
    }
}

impl TestContext {
    /// # Panics
    ///
    /// Panics if the fixture data is rejected.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        Self::with_config(RegisterConfig {
            settlement_delay: Duration::ZERO,
            ..RegisterConfig::default()
        })
    }

    /// # Panics
    ///
    /// Panics if the fixture data is rejected.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn with_config(config: RegisterConfig) -> Self {
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.add_product(product("Coffee", 350, "Drinks", "400100")).unwrap();
        catalog.add_product(product("Sandwich", 899, "Food", "400200")).unwrap();
        catalog.add_product(product("Home Fries", 425, "Food", "400300")).unwrap();
        catalog
            .add_customer(NewCustomer {
                name: "Dana Reyes".to_string(),
                email: "dana@example.com".to_string(),
                phone: String::new(),
                address: String::new(),
                notes: None,
            })
            .unwrap();

        let users = Arc::new(InMemoryUsers::new());
        for (username, role) in [(ADMIN, Role::Admin), (CASHIER, Role::Cashier)] {
            users
                .create_user(NewUser {
                    username: username.to_string(),
                    name: username.to_string(),
                    role,
                    permissions: None,
                })
                .unwrap();
        }

        let catalog_store: Arc<dyn CatalogStore> = catalog.clone();
        let state = AppState::new(config, catalog_store, users);
        Self { state, catalog }
    }

    #[must_use]
    pub fn app(&self) -> Router {
        tillpoint_register::app(self.state.clone())
    }

    /// Send one request as `user` and decode the JSON answer (`Value::Null`
    /// for empty or non-JSON bodies).
    ///
    /// # Panics
    ///
    /// Panics if the router fails to answer.
    #[allow(clippy::unwrap_used)]
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            request = request.header(USER_HEADER, user);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Send a request with a raw text body and return status and text.
    ///
    /// # Panics
    ///
    /// Panics if the router fails to answer.
    #[allow(clippy::unwrap_used)]
    pub async fn send_text(
        &self,
        method: Method,
        uri: &str,
        user: &str,
        body: &str,
    ) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(USER_HEADER, user)
            .header(header::CONTENT_TYPE, "text/csv")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
