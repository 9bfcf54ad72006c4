//! Checkout state machine.
//!
//! ```text
//! Idle ──begin──▶ PaymentSelection ──confirm──▶ Processing ──▶ Completed ──▶ Idle
//!  ▲                  │     ▲                        │
//!  └─────cancel───────┘     └──────── Failed ◀───────┘
//! ```
//!
//! `Completed` and `Failed` are pass-through states: a finished checkout is
//! back in `Idle` by the time `confirm_payment` returns, a failed one is back
//! in `PaymentSelection` with the cart untouched.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use tillpoint_core::{CustomerId, OrderId, OrderStatus, PaymentMethodId, ProductId, StoreId};

use crate::cart::{Cart, CartError, CartView, TaxPolicy};
use crate::catalog::{CatalogError, CatalogStore};
use crate::documents::{Document, DocumentError, DocumentRequest, DocumentSink};
use crate::models::{Customer, NewOrder, Order};
use crate::payment::{
    PaymentError, PaymentGateway, PaymentMethods, Settlement, SettlementAbort, SettlementRequest,
    SimulatedGateway,
};

/// Where a checkout currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    #[default]
    Idle,
    PaymentSelection,
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::PaymentSelection => write!(f, "payment selection"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// The cart must be empty for this operation.
    #[error("cart is not empty")]
    CartNotEmpty,

    /// The operation is not allowed in the current state.
    #[error("cannot {operation} while checkout is in {state}")]
    InvalidState {
        operation: &'static str,
        state: CheckoutState,
    },

    /// The payment method is not offered by this register.
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(PaymentMethodId),

    #[error("customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order exists but is not a held cart.
    #[error("order {id} is {status}, not held")]
    NotHeld { id: OrderId, status: OrderStatus },

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// What happened to the customer record after a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CustomerUpdate {
    /// Guest or non-credit checkout; no customer was touched.
    NotApplicable,
    Updated { customer: Customer },
    /// The order stands, but the balance could not be updated.
    Failed { message: String },
}

/// A completed checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub receipt: Document,
    pub settlement: Settlement,
    pub customer_update: CustomerUpdate,
}

/// Register-level checkout settings.
#[derive(Debug, Clone, Default)]
pub struct CheckoutConfig {
    pub payment_methods: PaymentMethods,
    pub tax_policy: TaxPolicy,
    /// Store this register belongs to; selects the tax rate.
    pub store_id: Option<StoreId>,
}

/// Checkout status as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutView {
    pub state: CheckoutState,
    pub payment_method: PaymentMethodId,
    pub customer_id: Option<CustomerId>,
    pub payment_methods: PaymentMethods,
    pub last_error: Option<String>,
    pub cart: CartView,
}

/// Falls back to payment selection if a settlement is dropped before it
/// resolves, e.g. when the request driving it goes away.
struct SettlementGuard<'a> {
    state: &'a mut CheckoutState,
    last_error: &'a mut Option<String>,
    armed: bool,
}

impl SettlementGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SettlementGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("Settlement interrupted before it resolved");
        *self.state = CheckoutState::PaymentSelection;
        *self.last_error = Some(PaymentError::Aborted.to_string());
    }
}

/// One till: a cart and the checkout around it.
pub struct Register<G = SimulatedGateway> {
    catalog: Arc<dyn CatalogStore>,
    documents: Arc<dyn DocumentSink>,
    gateway: G,
    abort: SettlementAbort,
    config: CheckoutConfig,
    cart: Cart,
    state: CheckoutState,
    payment_method: PaymentMethodId,
    customer_id: Option<CustomerId>,
    last_error: Option<String>,
}

impl<G: PaymentGateway> Register<G> {
    /// Create a register with an empty cart in `Idle`.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        documents: Arc<dyn DocumentSink>,
        gateway: G,
        config: CheckoutConfig,
    ) -> Self {
        let cart = Cart::new(config.tax_policy.rate_for(config.store_id));
        let payment_method = config.payment_methods.default_method().id.clone();
        Self {
            catalog,
            documents,
            gateway,
            abort: SettlementAbort::new(),
            config,
            cart,
            state: CheckoutState::Idle,
            payment_method,
            customer_id: None,
            last_error: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Add one unit of a catalog product. Returns `false` if it is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    pub fn add_product(&mut self, id: ProductId) -> Result<bool, CatalogError> {
        self.cart.add_product_by_id(self.catalog.as_ref(), id)
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    #[must_use]
    pub const fn payment_method(&self) -> &PaymentMethodId {
        &self.payment_method
    }

    #[must_use]
    pub const fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    #[must_use]
    pub const fn payment_methods(&self) -> &PaymentMethods {
        &self.config.payment_methods
    }

    /// A handle that aborts the settlement in flight without locking the register.
    #[must_use]
    pub fn abort_handle(&self) -> SettlementAbort {
        self.abort.clone()
    }

    #[must_use]
    pub fn view(&self) -> CheckoutView {
        CheckoutView {
            state: self.state,
            payment_method: self.payment_method.clone(),
            customer_id: self.customer_id,
            payment_methods: self.config.payment_methods.clone(),
            last_error: self.last_error.clone(),
            cart: self.cart.view(),
        }
    }

    fn transition(&mut self, to: CheckoutState) {
        debug!(from = %self.state, %to, "Checkout transition");
        self.state = to;
    }

    fn require_state(
        &self,
        expected: CheckoutState,
        operation: &'static str,
    ) -> Result<(), CheckoutError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CheckoutError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Open payment selection for the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] without changing state when there
    /// is nothing to pay for.
    pub fn begin_checkout(&mut self) -> Result<(), CheckoutError> {
        self.require_state(CheckoutState::Idle, "begin checkout")?;
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.last_error = None;
        self.transition(CheckoutState::PaymentSelection);
        Ok(())
    }

    /// Choose how the customer pays.
    ///
    /// # Errors
    ///
    /// Returns an error if the method is not configured or a payment is in flight.
    pub fn select_payment_method(&mut self, id: PaymentMethodId) -> Result<(), CheckoutError> {
        self.require_selectable("select payment method")?;
        if !self.config.payment_methods.contains(&id) {
            return Err(CheckoutError::UnknownPaymentMethod(id));
        }
        self.payment_method = id;
        Ok(())
    }

    /// Attach a customer to the sale, or `None` for a guest.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer does not exist or a payment is in flight.
    pub fn select_customer(&mut self, id: Option<CustomerId>) -> Result<(), CheckoutError> {
        self.require_selectable("select customer")?;
        if let Some(id) = id
            && self.catalog.get_customer(id)?.is_none()
        {
            return Err(CheckoutError::CustomerNotFound(id));
        }
        self.customer_id = id;
        Ok(())
    }

    fn require_selectable(&self, operation: &'static str) -> Result<(), CheckoutError> {
        match self.state {
            CheckoutState::Idle | CheckoutState::PaymentSelection => Ok(()),
            state => Err(CheckoutError::InvalidState { operation, state }),
        }
    }

    /// Leave payment selection. The cart is kept.
    ///
    /// # Errors
    ///
    /// Returns an error unless checkout is in payment selection.
    pub fn cancel_checkout(&mut self) -> Result<(), CheckoutError> {
        self.require_state(CheckoutState::PaymentSelection, "cancel checkout")?;
        self.last_error = None;
        self.transition(CheckoutState::Idle);
        info!("Checkout cancelled");
        Ok(())
    }

    /// Take payment and turn the cart into a completed order.
    ///
    /// On failure the register is back in payment selection with the cart intact.
    ///
    /// # Errors
    ///
    /// Validation errors (empty cart, unknown method, missing credit customer)
    /// are returned before anything changes. Settlement, persistence and
    /// receipt errors are returned after falling back to payment selection.
    #[instrument(skip(self), fields(method = %self.payment_method, customer_id = ?self.customer_id))]
    pub async fn confirm_payment(&mut self) -> Result<CheckoutOutcome, CheckoutError> {
        self.require_state(CheckoutState::PaymentSelection, "confirm payment")?;
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if !self.config.payment_methods.contains(&self.payment_method) {
            return Err(CheckoutError::UnknownPaymentMethod(
                self.payment_method.clone(),
            ));
        }
        let customer = self.resolve_customer()?;

        self.last_error = None;
        self.transition(CheckoutState::Processing);

        let subtotal = self.cart.subtotal();
        let tax = self.cart.tax();
        let total = subtotal.saturating_add(tax);
        let request = SettlementRequest {
            amount: total,
            method: self.payment_method.clone(),
            customer_id: customer.as_ref().map(|c| c.id),
        };
        let signal = self.abort.arm();
        let guard = SettlementGuard {
            state: &mut self.state,
            last_error: &mut self.last_error,
            armed: true,
        };
        let settled = self.gateway.settle(request, signal).await;
        guard.disarm();
        let settlement = match settled {
            Ok(settlement) => settlement,
            Err(e) => return Err(self.fail(e.into())),
        };

        let new_order = NewOrder {
            customer_id: customer.as_ref().map(|c| c.id),
            customer_name: customer.as_ref().map(|c| c.name.clone()),
            items: self.cart.snapshot(),
            date: Utc::now(),
            subtotal,
            tax: Some(tax),
            total,
            payment_method: self.payment_method.clone(),
            status: OrderStatus::Completed,
            store_id: self.config.store_id,
            notes: None,
        };
        let order = match self.catalog.add_order(new_order) {
            Ok(order) => order,
            Err(e) => return Err(self.fail(e.into())),
        };

        let receipt = match self.documents.render(DocumentRequest::Receipt(&order)) {
            Ok(receipt) => receipt,
            Err(e) => {
                if let Err(rollback) = self.catalog.delete_order(order.id) {
                    warn!(order_id = %order.id, error = %rollback, "Failed to remove order after receipt error");
                }
                return Err(self.fail(e.into()));
            }
        };

        self.transition(CheckoutState::Completed);
        let customer_update = self.apply_credit(customer.as_ref(), total);
        info!(order_id = %order.id, %total, reference = %settlement.reference, "Checkout completed");

        self.cart.clear();
        self.payment_method = self.config.payment_methods.default_method().id.clone();
        self.customer_id = None;
        self.transition(CheckoutState::Idle);

        Ok(CheckoutOutcome {
            order,
            receipt,
            settlement,
            customer_update,
        })
    }

    fn resolve_customer(&self) -> Result<Option<Customer>, CheckoutError> {
        let Some(id) = self.customer_id else {
            return Ok(None);
        };
        match self.catalog.get_customer(id)? {
            Some(customer) => Ok(Some(customer)),
            None if self.payment_method.is_credit() => Err(CheckoutError::CustomerNotFound(id)),
            None => {
                warn!(customer_id = %id, "Selected customer no longer exists, checking out as guest");
                Ok(None)
            }
        }
    }

    fn apply_credit(&self, customer: Option<&Customer>, total: Decimal) -> CustomerUpdate {
        let Some(customer) = customer.filter(|_| self.payment_method.is_credit()) else {
            return CustomerUpdate::NotApplicable;
        };
        match self.catalog.adjust_customer_totals(customer.id, 1, total) {
            Ok(Some(customer)) => {
                info!(customer_id = %customer.id, balance = %customer.total_spent, "Store credit charged");
                CustomerUpdate::Updated { customer }
            }
            Ok(None) => {
                warn!(customer_id = %customer.id, "Customer vanished before credit could be charged");
                CustomerUpdate::Failed {
                    message: format!("customer {} not found", customer.id),
                }
            }
            Err(e) => {
                warn!(customer_id = %customer.id, error = %e, "Failed to charge store credit");
                CustomerUpdate::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    fn fail(&mut self, error: CheckoutError) -> CheckoutError {
        warn!(%error, "Checkout failed");
        self.transition(CheckoutState::Failed);
        self.last_error = Some(error.to_string());
        self.transition(CheckoutState::PaymentSelection);
        error
    }

    /// Park the current cart as an in-progress order and start a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an error unless the register is idle with items in the cart.
    #[instrument(skip(self))]
    pub fn hold_order(&mut self, notes: Option<String>) -> Result<Order, CheckoutError> {
        self.require_state(CheckoutState::Idle, "hold order")?;
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let customer = match self.customer_id {
            Some(id) => self.catalog.get_customer(id)?,
            None => None,
        };

        let subtotal = self.cart.subtotal();
        let tax = self.cart.tax();
        let held = self.catalog.add_order(NewOrder {
            customer_id: customer.as_ref().map(|c| c.id),
            customer_name: customer.map(|c| c.name),
            items: self.cart.snapshot(),
            date: Utc::now(),
            subtotal,
            tax: Some(tax),
            total: subtotal.saturating_add(tax),
            payment_method: self.payment_method.clone(),
            status: OrderStatus::InProgress,
            store_id: self.config.store_id,
            notes,
        })?;

        self.cart.clear();
        self.customer_id = None;
        info!(order_id = %held.id, "Order held");
        Ok(held)
    }

    /// Bring a held order back into the (empty) cart and drop the held copy.
    ///
    /// # Errors
    ///
    /// Returns an error unless the register is idle with an empty cart, or if
    /// the order is unknown or not held. Nothing changes on error.
    #[instrument(skip(self))]
    pub fn resume_order(&mut self, order_id: OrderId) -> Result<(), CheckoutError> {
        self.require_state(CheckoutState::Idle, "resume order")?;
        if !self.cart.is_empty() {
            return Err(CheckoutError::CartNotEmpty);
        }
        let order = self
            .catalog
            .get_order(order_id)?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;
        if order.status != OrderStatus::InProgress {
            return Err(CheckoutError::NotHeld {
                id: order_id,
                status: order.status,
            });
        }

        self.catalog.delete_order(order_id)?;
        self.cart.restore(order.items);
        self.customer_id = order.customer_id;
        if self.config.payment_methods.contains(&order.payment_method) {
            self.payment_method = order.payment_method;
        }
        info!(%order_id, "Held order resumed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::documents::{DocumentKind, HtmlDocumentSink};
    use crate::models::{NewCustomer, NewProduct};

    struct BrokenPrinter;

    impl DocumentSink for BrokenPrinter {
        fn render(&self, request: DocumentRequest<'_>) -> Result<Document, DocumentError> {
            Err(DocumentError::Render {
                kind: request.kind(),
                message: "printer offline".to_string(),
            })
        }
    }

    fn catalog() -> Arc<InMemoryCatalog> {
        let catalog = InMemoryCatalog::new();
        for (name, cents) in [("Coffee", 350), ("Sandwich", 899)] {
            catalog
                .add_product(NewProduct {
                    name: name.to_string(),
                    price: Decimal::new(cents, 2),
                    category: "Cafe".to_string(),
                    in_stock: 10,
                    store_id: None,
                    barcode: None,
                    image: String::new(),
                    description: None,
                })
                .unwrap();
        }
        catalog
            .add_customer(NewCustomer {
                name: "Dana Reyes".to_string(),
                email: "dana@example.com".to_string(),
                phone: String::new(),
                address: String::new(),
                notes: None,
            })
            .unwrap();
        Arc::new(catalog)
    }

    fn register_with(
        catalog: &Arc<InMemoryCatalog>,
        documents: Arc<dyn DocumentSink>,
        gateway: SimulatedGateway,
    ) -> Register {
        Register::new(catalog.clone(), documents, gateway, CheckoutConfig::default())
    }

    fn register(catalog: &Arc<InMemoryCatalog>) -> Register {
        register_with(
            catalog,
            Arc::new(HtmlDocumentSink::default()),
            SimulatedGateway::new(Duration::ZERO),
        )
    }

    fn fill(register: &mut Register) {
        for id in [1, 1, 2] {
            assert!(register.add_product(ProductId::new(id)).unwrap());
        }
    }

    #[test]
    fn test_begin_with_empty_cart_stays_idle() {
        let catalog = catalog();
        let mut register = register(&catalog);
        assert!(matches!(
            register.begin_checkout(),
            Err(CheckoutError::EmptyCart)
        ));
        assert_eq!(register.state(), CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_cash_checkout_completes() {
        let catalog = catalog();
        let mut register = register(&catalog);
        fill(&mut register);

        register.begin_checkout().unwrap();
        let outcome = register.confirm_payment().await.unwrap();

        assert_eq!(register.state(), CheckoutState::Idle);
        assert!(register.cart().is_empty());
        assert_eq!(outcome.order.status, OrderStatus::Completed);
        assert_eq!(outcome.order.total, Decimal::new(17589, 3));
        assert_eq!(outcome.order.items.len(), 2);
        assert_eq!(outcome.receipt.kind, DocumentKind::Receipt);
        assert_eq!(outcome.customer_update, CustomerUpdate::NotApplicable);
        assert_eq!(catalog.list_orders().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_credit_checkout_charges_customer() {
        let catalog = catalog();
        let mut register = register(&catalog);
        fill(&mut register);

        register.begin_checkout().unwrap();
        register
            .select_payment_method(PaymentMethodId::new("credit"))
            .unwrap();
        register.select_customer(Some(CustomerId::new(1))).unwrap();
        let outcome = register.confirm_payment().await.unwrap();

        let dana = catalog.get_customer(CustomerId::new(1)).unwrap().unwrap();
        assert_eq!(dana.total_spent, outcome.order.total);
        assert_eq!(dana.total_orders, 1);
        assert_eq!(outcome.order.customer_name.as_deref(), Some("Dana Reyes"));
        assert_eq!(register.payment_method().as_str(), "cash");
        assert_eq!(register.customer_id(), None);
    }

    #[tokio::test]
    async fn test_cash_checkout_with_customer_leaves_balance() {
        let catalog = catalog();
        let mut register = register(&catalog);
        fill(&mut register);

        register.begin_checkout().unwrap();
        register.select_customer(Some(CustomerId::new(1))).unwrap();
        register.confirm_payment().await.unwrap();

        let dana = catalog.get_customer(CustomerId::new(1)).unwrap().unwrap();
        assert_eq!(dana.total_spent, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_credit_for_vanished_customer_rejected_before_mutation() {
        let catalog = catalog();
        let mut register = register(&catalog);
        fill(&mut register);

        register.begin_checkout().unwrap();
        register
            .select_payment_method(PaymentMethodId::new("credit"))
            .unwrap();
        register.select_customer(Some(CustomerId::new(1))).unwrap();
        catalog.delete_customer(CustomerId::new(1)).unwrap();

        assert!(matches!(
            register.confirm_payment().await,
            Err(CheckoutError::CustomerNotFound(_))
        ));
        assert_eq!(register.state(), CheckoutState::PaymentSelection);
        assert_eq!(register.cart().item_count(), 3);
        assert!(catalog.list_orders().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_declined_payment_returns_to_selection() {
        let catalog = catalog();
        let mut register = register_with(
            &catalog,
            Arc::new(HtmlDocumentSink::default()),
            SimulatedGateway::declining("insufficient funds"),
        );
        fill(&mut register);

        register.begin_checkout().unwrap();
        assert!(matches!(
            register.confirm_payment().await,
            Err(CheckoutError::Payment(PaymentError::Declined(_)))
        ));
        assert_eq!(register.state(), CheckoutState::PaymentSelection);
        assert_eq!(register.cart().item_count(), 3);
        assert!(register.view().last_error.is_some());
        assert!(catalog.list_orders().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_receipt_failure_removes_order() {
        let catalog = catalog();
        let mut register = register_with(
            &catalog,
            Arc::new(BrokenPrinter),
            SimulatedGateway::new(Duration::ZERO),
        );
        fill(&mut register);

        register.begin_checkout().unwrap();
        register
            .select_payment_method(PaymentMethodId::new("credit"))
            .unwrap();
        register.select_customer(Some(CustomerId::new(1))).unwrap();
        assert!(matches!(
            register.confirm_payment().await,
            Err(CheckoutError::Document(_))
        ));

        assert_eq!(register.state(), CheckoutState::PaymentSelection);
        assert!(catalog.list_orders().unwrap().is_empty());
        let dana = catalog.get_customer(CustomerId::new(1)).unwrap().unwrap();
        assert_eq!(dana.total_spent, Decimal::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_during_settlement() {
        let catalog = catalog();
        let mut register = register_with(
            &catalog,
            Arc::new(HtmlDocumentSink::default()),
            SimulatedGateway::default(),
        );
        fill(&mut register);
        register.begin_checkout().unwrap();

        let abort = register.abort_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            abort.abort();
        });

        assert!(matches!(
            register.confirm_payment().await,
            Err(CheckoutError::Payment(PaymentError::Aborted))
        ));
        assert_eq!(register.state(), CheckoutState::PaymentSelection);
        assert!(!register.cart().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_settlement_returns_to_selection() {
        let catalog = catalog();
        let mut register = register_with(
            &catalog,
            Arc::new(HtmlDocumentSink::default()),
            SimulatedGateway::default(),
        );
        fill(&mut register);
        register.begin_checkout().unwrap();

        let timed_out =
            tokio::time::timeout(Duration::from_millis(100), register.confirm_payment()).await;
        assert!(timed_out.is_err());

        assert_eq!(register.state(), CheckoutState::PaymentSelection);
        assert!(register.view().last_error.is_some());
        assert_eq!(register.cart().item_count(), 3);
        assert!(catalog.list_orders().unwrap().is_empty());

        register.cancel_checkout().unwrap();
        register.begin_checkout().unwrap();
        let outcome = register.confirm_payment().await.unwrap();
        assert_eq!(outcome.order.items.len(), 2);
        assert_eq!(register.state(), CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_credit_for_guest_touches_no_customer() {
        let catalog = catalog();
        let before = catalog.list_customers().unwrap();
        let mut register = register(&catalog);
        fill(&mut register);

        register.begin_checkout().unwrap();
        register
            .select_payment_method(PaymentMethodId::new("credit"))
            .unwrap();
        register.select_customer(None).unwrap();
        let outcome = register.confirm_payment().await.unwrap();

        assert_eq!(outcome.customer_update, CustomerUpdate::NotApplicable);
        assert_eq!(outcome.order.customer_id, None);
        assert_eq!(catalog.list_customers().unwrap(), before);
    }

    #[test]
    fn test_cart_edit_above_maximum_rejected() {
        let catalog = catalog();
        let mut register = register(&catalog);
        fill(&mut register);
        let err = crate::actions::update_quantity(&mut register, ProductId::new(1), 3_000_000_000)
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Cart(CartError::QuantityTooLarge { .. })));
        assert_eq!(register.cart().item_count(), 3);
    }

    #[test]
    fn test_cancel_only_from_payment_selection() {
        let catalog = catalog();
        let mut register = register(&catalog);
        assert!(matches!(
            register.cancel_checkout(),
            Err(CheckoutError::InvalidState { .. })
        ));

        fill(&mut register);
        register.begin_checkout().unwrap();
        register.cancel_checkout().unwrap();
        assert_eq!(register.state(), CheckoutState::Idle);
        assert_eq!(register.cart().item_count(), 3);
    }

    #[test]
    fn test_unknown_payment_method_rejected() {
        let catalog = catalog();
        let mut register = register(&catalog);
        assert!(matches!(
            register.select_payment_method(PaymentMethodId::new("cheque")),
            Err(CheckoutError::UnknownPaymentMethod(_))
        ));
        assert_eq!(register.payment_method().as_str(), "cash");
    }

    #[test]
    fn test_hold_and_resume() {
        let catalog = catalog();
        let mut register = register(&catalog);
        fill(&mut register);
        register.select_customer(Some(CustomerId::new(1))).unwrap();

        let held = register.hold_order(Some("back in 5".to_string())).unwrap();
        assert_eq!(held.status, OrderStatus::InProgress);
        assert!(register.cart().is_empty());

        register.add_product(ProductId::new(2)).unwrap();
        assert!(matches!(
            register.resume_order(held.id),
            Err(CheckoutError::CartNotEmpty)
        ));
        register.cart_mut().clear();

        register.resume_order(held.id).unwrap();
        assert_eq!(register.cart().item_count(), 3);
        assert_eq!(register.customer_id(), Some(CustomerId::new(1)));
        assert!(catalog.get_order(held.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resume_rejects_completed_order() {
        let catalog = catalog();
        let mut register = register(&catalog);
        fill(&mut register);
        register.begin_checkout().unwrap();
        let outcome = register.confirm_payment().await.unwrap();

        assert!(matches!(
            register.resume_order(outcome.order.id),
            Err(CheckoutError::NotHeld { .. })
        ));
        assert!(matches!(
            register.resume_order(OrderId::new(99)),
            Err(CheckoutError::OrderNotFound(_))
        ));
        assert!(register.cart().is_empty());
    }
}
