//! HTTP route handlers for the register.
//!
//! Every `/api` route identifies the acting user with the `x-register-user`
//! header and checks that user's permission for the feature it serves.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                               - Health check
//!
//! # Session
//! GET  /api/session                          - Acting user and landing route
//!
//! # Products
//! GET  /api/products[?barcode=]              - Product listing / barcode lookup
//! POST /api/products                         - Create product
//! GET  /api/products/{id}                    - Product detail
//! PUT  /api/products/{id}                    - Update product
//! DELETE /api/products/{id}                  - Delete product
//! POST /api/products/import                  - Bulk CSV import
//! GET  /api/products/export?format=csv|html  - Catalog export
//!
//! # Customers
//! GET|POST /api/customers                    - Listing / create
//! GET|PUT|DELETE /api/customers/{id}         - Detail / update / delete
//! POST /api/customers/{id}/credit-payments   - Record a store-credit repayment
//! POST /api/customers/import                 - Bulk CSV import
//!
//! # Orders
//! GET  /api/orders[?status=]                 - Order listing
//! GET  /api/orders/{id}                      - Order detail
//! POST /api/orders/{id}/status               - Change status
//! GET  /api/orders/{id}/receipt              - Printable receipt
//!
//! # Reports
//! GET  /api/reports/daily?date=&format=      - Daily sales report
//!
//! # Cart
//! GET  /api/cart                             - Cart and checkout view
//! POST /api/cart/add|update|remove|clear     - Cart edits
//!
//! # Checkout
//! POST /api/checkout/begin|payment-method|customer|confirm|cancel|abort|hold
//! POST /api/checkout/resume/{order_id}
//!
//! # Voice
//! GET  /api/voice                            - Listening state
//! POST /api/voice/start|stop                 - Toggle listening
//! POST /api/voice/page                       - Register the shown page's commands
//! POST /api/voice/events                     - Recognizer events from the client
//!
//! # Users
//! GET|POST /api/users                        - Listing / create
//! DELETE /api/users/{id}                     - Delete user
//! PUT  /api/users/{id}/role                  - Change role
//! PUT  /api/users/{id}/permissions           - Replace permissions
//! ```

pub mod cart;
pub mod checkout;
pub mod customers;
pub mod orders;
pub mod products;
pub mod reports;
pub mod users;
pub mod voice;

use axum::{
    Router,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use crate::documents::Document;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/import", post(products::import))
        .route("/export", get(products::export))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::index).post(customers::create))
        .route("/import", post(customers::import))
        .route(
            "/{id}",
            get(customers::show)
                .put(customers::update)
                .delete(customers::delete),
        )
        .route("/{id}/credit-payments", post(customers::credit_payment))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
        .route("/{id}/receipt", get(orders::receipt))
}

/// Create the report routes router.
pub fn report_routes() -> Router<AppState> {
    Router::new().route("/daily", get(reports::daily))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/begin", post(checkout::begin))
        .route("/payment-method", post(checkout::payment_method))
        .route("/customer", post(checkout::customer))
        .route("/confirm", post(checkout::confirm))
        .route("/cancel", post(checkout::cancel))
        .route("/abort", post(checkout::abort))
        .route("/hold", post(checkout::hold))
        .route("/resume/{order_id}", post(checkout::resume))
}

/// Create the voice routes router.
pub fn voice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(voice::status))
        .route("/start", post(voice::start))
        .route("/stop", post(voice::stop))
        .route("/page", post(voice::page))
        .route("/events", post(voice::events))
}

/// Create the user administration routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route("/{id}", axum::routing::delete(users::delete))
        .route("/{id}/role", put(users::update_role))
        .route("/{id}/permissions", put(users::update_permissions))
}

/// Create all routes for the register.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/session", get(users::session))
        .nest("/api/products", product_routes())
        .nest("/api/customers", customer_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/reports", report_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
        .nest("/api/voice", voice_routes())
        .nest("/api/users", user_routes())
}

/// Serve a rendered document inline.
fn document_response(document: Document) -> Response {
    (
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", document.filename),
            ),
        ],
        document.body,
    )
        .into_response()
}
