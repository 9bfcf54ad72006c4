//! Tillpoint register library.
//!
//! The point-of-sale engine (catalog, cart, checkout, voice commands) and
//! the JSON API serving it, as a library so it can be tested and driven from
//! the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actions;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod documents;
pub mod error;
pub mod import;
pub mod middleware;
pub mod models;
pub mod payment;
pub mod permissions;
pub mod routes;
pub mod services;
pub mod state;
pub mod users;
pub mod voice;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tracing::info;

use tillpoint_core::Role;

use catalog::{CatalogSeed, InMemoryCatalog, seed::SeedError};
use config::RegisterConfig;
use models::NewUser;
use state::AppState;
use users::{InMemoryUsers, UserDirectory};

/// Build in-memory stores from `config`, loading the seed file if one is set.
///
/// A directory left without users gets an `admin` account so the register can
/// be opened at all.
///
/// # Errors
///
/// Returns an error if the seed file cannot be read or an entry is rejected.
pub fn bootstrap(config: RegisterConfig) -> Result<AppState, SeedError> {
    let catalog = Arc::new(InMemoryCatalog::new());
    let users = Arc::new(InMemoryUsers::new());

    if let Some(path) = &config.seed_file {
        let seed = CatalogSeed::from_yaml_file(path)?;
        seed.load_users(users.as_ref())?;
        seed.load_into(catalog.as_ref())?;
    }

    if users.list_users()?.is_empty() {
        users.create_user(NewUser {
            username: "admin".to_string(),
            name: "Administrator".to_string(),
            role: Role::Admin,
            permissions: None,
        })?;
        info!("No users configured, created default admin");
    }

    Ok(AppState::new(config, catalog, users))
}

/// The full router with tracing and Sentry layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
