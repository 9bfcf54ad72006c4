//! Core types for Tillpoint.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod payment;
pub mod role;
pub mod status;

pub use id::*;
pub use money::{Money, TaxRate, TaxRateError};
pub use payment::{PaymentMethod, PaymentMethodId};
pub use role::{Feature, Permissions, Role};
pub use status::*;
