//! Payment methods and settlement.
//!
//! Settlement goes through a [`PaymentGateway`]. The register ships with a
//! [`SimulatedGateway`] that approves after a fixed delay; a card terminal
//! integration would implement the same trait.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{Instrument, info, info_span};

use tillpoint_core::{CustomerId, PaymentMethod, PaymentMethodId};

/// Default delay of the simulated gateway.
pub const DEFAULT_SETTLEMENT_DELAY: Duration = Duration::from_millis(1500);

/// Errors that can occur during settlement.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The gateway refused the payment.
    #[error("payment declined: {0}")]
    Declined(String),

    /// Settlement was aborted before it finished.
    #[error("settlement aborted")]
    Aborted,

    /// The gateway could not be reached.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// The payment methods a register offers.
///
/// Never empty; the first method is the default selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PaymentMethods(Vec<PaymentMethod>);

impl PaymentMethods {
    /// Build a method set. Returns `None` when `methods` is empty.
    #[must_use]
    pub fn new(methods: Vec<PaymentMethod>) -> Option<Self> {
        if methods.is_empty() {
            None
        } else {
            Some(Self(methods))
        }
    }

    /// The method selected when a checkout starts.
    #[must_use]
    #[allow(clippy::indexing_slicing)] // non-empty by construction
    pub fn default_method(&self) -> &PaymentMethod {
        &self.0[0]
    }

    #[must_use]
    pub fn contains(&self, id: &PaymentMethodId) -> bool {
        self.0.iter().any(|method| &method.id == id)
    }

    #[must_use]
    pub fn get(&self, id: &PaymentMethodId) -> Option<&PaymentMethod> {
        self.0.iter().find(|method| &method.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.0.iter()
    }
}

impl Default for PaymentMethods {
    fn default() -> Self {
        Self(vec![
            PaymentMethod::new("cash", "Cash"),
            PaymentMethod::new("card", "Card"),
            PaymentMethod::new(PaymentMethodId::CREDIT, "Store Credit"),
        ])
    }
}

/// What is being paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementRequest {
    pub amount: Decimal,
    pub method: PaymentMethodId,
    pub customer_id: Option<CustomerId>,
}

/// A completed settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub reference: String,
    pub amount: Decimal,
}

/// Settles payments.
pub trait PaymentGateway: Send + Sync + 'static {
    /// Settle `request`. Implementations must give up with
    /// [`PaymentError::Aborted`] once `abort` fires.
    fn settle(
        &self,
        request: SettlementRequest,
        abort: AbortSignal,
    ) -> impl Future<Output = Result<Settlement, PaymentError>> + Send;
}

/// Handle for aborting the settlement in flight.
///
/// Clones share the same signal, so one clone can live next to the register
/// while another is used from a different task.
#[derive(Debug, Clone)]
pub struct SettlementAbort {
    tx: Arc<watch::Sender<bool>>,
}

impl SettlementAbort {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Abort the settlement in flight, if any.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    /// Arm a fresh signal for the next settlement. Clears any earlier abort.
    #[must_use]
    pub fn arm(&self) -> AbortSignal {
        self.tx.send_replace(false);
        AbortSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for SettlementAbort {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`SettlementAbort`].
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    /// Resolves once an abort was requested. Never resolves if the handle is gone.
    pub async fn aborted(&mut self) {
        if self.rx.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }
}

/// A gateway that approves every payment after a fixed delay.
#[derive(Debug)]
pub struct SimulatedGateway {
    delay: Duration,
    decline: Option<String>,
    next_reference: AtomicU64,
}

impl SimulatedGateway {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            decline: None,
            next_reference: AtomicU64::new(1),
        }
    }

    /// A gateway that declines every payment with `reason`.
    #[must_use]
    pub fn declining(reason: &str) -> Self {
        Self {
            decline: Some(reason.to_string()),
            ..Self::new(Duration::ZERO)
        }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLEMENT_DELAY)
    }
}

impl PaymentGateway for SimulatedGateway {
    fn settle(
        &self,
        request: SettlementRequest,
        mut abort: AbortSignal,
    ) -> impl Future<Output = Result<Settlement, PaymentError>> + Send {
        let delay = self.delay;
        let decline = self.decline.clone();
        let reference = format!(
            "SIM-{:06}",
            self.next_reference.fetch_add(1, Ordering::Relaxed)
        );

        let span = info_span!("settle", amount = %request.amount, method = %request.method);
        async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = abort.aborted() => return Err(PaymentError::Aborted),
            }
            if let Some(reason) = decline {
                return Err(PaymentError::Declined(reason));
            }
            info!(%reference, "Payment settled");
            Ok(Settlement {
                reference,
                amount: request.amount,
            })
        }
        .instrument(span)
    }
}
