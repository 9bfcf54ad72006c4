//! HTTP middleware and extractors for the register.
//!
//! The layer stack itself lives in `main.rs` / [`crate::app`]:
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. Routes, which identify the acting user with [`CurrentUser`]

pub mod auth;

pub use auth::{CurrentUser, USER_HEADER};
