//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use tillpoint_core::Feature;

use crate::actions::PosIntent;
use crate::catalog::{CatalogError, CatalogStore};
use crate::checkout::Register;
use crate::config::RegisterConfig;
use crate::documents::{DocumentSink, HtmlDocumentSink};
use crate::payment::{PaymentMethods, SettlementAbort, SimulatedGateway};
use crate::users::UserDirectory;
use crate::voice::{RemoteRecognizer, VoiceDispatcher, VoiceListener, global_commands, page_commands};

/// Voice dispatch state. `listener` is `None` when voice is disabled.
pub struct VoiceState {
    pub dispatcher: VoiceDispatcher<PosIntent>,
    pub listener: Option<VoiceListener<RemoteRecognizer>>,
    page: Option<Feature>,
}

impl VoiceState {
    fn new(enabled: bool) -> Self {
        let listener = match VoiceListener::new(RemoteRecognizer::new(enabled)) {
            Ok(listener) => Some(listener),
            Err(e) => {
                warn!(error = %e, "Voice commands disabled");
                None
            }
        };
        Self {
            dispatcher: VoiceDispatcher::new(global_commands()),
            listener,
            page: None,
        }
    }

    /// The page whose commands are registered.
    #[must_use]
    pub const fn page(&self) -> Option<Feature> {
        self.page
    }

    /// Register the commands of `page`, replacing the previous page's.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    pub fn show_page(
        &mut self,
        page: Feature,
        catalog: &dyn CatalogStore,
        payment_methods: &PaymentMethods,
    ) -> Result<(), CatalogError> {
        let commands = page_commands(page, catalog, payment_methods)?;
        self.dispatcher.set_page_commands(page.route(), commands);
        self.page = Some(page);
        Ok(())
    }

    /// Rebuild the current page's commands so product edits are picked up.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    pub fn refresh(
        &mut self,
        catalog: &dyn CatalogStore,
        payment_methods: &PaymentMethods,
    ) -> Result<(), CatalogError> {
        match self.page {
            Some(page) => self.show_page(page, catalog, payment_methods),
            None => Ok(()),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog, the user directory and the single register session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RegisterConfig,
    catalog: Arc<dyn CatalogStore>,
    users: Arc<dyn UserDirectory>,
    documents: Arc<dyn DocumentSink>,
    register: Mutex<Register>,
    abort: SettlementAbort,
    voice: Mutex<VoiceState>,
}

impl AppState {
    /// Create a new application state around an already seeded catalog and
    /// user directory.
    #[must_use]
    pub fn new(
        config: RegisterConfig,
        catalog: Arc<dyn CatalogStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        let documents: Arc<dyn DocumentSink> =
            Arc::new(HtmlDocumentSink::new(config.store_name.clone()));
        let register = Register::new(
            Arc::clone(&catalog),
            Arc::clone(&documents),
            SimulatedGateway::new(config.settlement_delay),
            config.checkout.clone(),
        );
        let abort = register.abort_handle();
        let voice = VoiceState::new(config.voice_enabled);
        info!(
            store = %config.store_name,
            voice = voice.listener.is_some(),
            "Register state ready"
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                users,
                documents,
                register: Mutex::new(register),
                abort,
                voice: Mutex::new(voice),
            }),
        }
    }

    /// Get a reference to the register configuration.
    #[must_use]
    pub fn config(&self) -> &RegisterConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.inner.catalog.as_ref()
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserDirectory {
        self.inner.users.as_ref()
    }

    #[must_use]
    pub fn documents(&self) -> &dyn DocumentSink {
        self.inner.documents.as_ref()
    }

    /// Lock the register session.
    ///
    /// Held across a settlement; use [`abort`](Self::abort) to interrupt one.
    pub async fn register(&self) -> MutexGuard<'_, Register> {
        self.inner.register.lock().await
    }

    /// Abort handle for the settlement in flight. Never takes the register lock.
    #[must_use]
    pub fn abort(&self) -> &SettlementAbort {
        &self.inner.abort
    }

    pub async fn voice(&self) -> MutexGuard<'_, VoiceState> {
        self.inner.voice.lock().await
    }
}
