//! Business logic that spans the catalog and the register.
//!
//! # Services
//!
//! - `credit` - Store-credit repayments
//! - `reports` - Daily sales figures

pub mod credit;
pub mod reports;

pub use credit::{CreditError, record_credit_payment};
pub use reports::{MethodTotal, SalesSummary, orders_on, summarize};
