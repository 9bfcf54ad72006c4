//! Monetary amounts and tax rates using decimal arithmetic.
//!
//! Amounts are kept exact (`rust_decimal::Decimal`) everywhere in the
//! register. Rounding to cents happens only when an amount is displayed,
//! so `15.99 * 0.10` stays `1.599` in stored orders and prints as `$1.60`.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places shown for currency amounts.
const DISPLAY_SCALE: u32 = 2;

/// A display wrapper for a currency amount.
///
/// ```
/// use rust_decimal::Decimal;
/// use tillpoint_core::Money;
///
/// let total = Money::new(Decimal::new(17_589, 3));
/// assert_eq!(total.to_string(), "$17.59");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap an exact amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The exact, unrounded amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount rounded to cents (half away from zero).
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded();
        if rounded.is_sign_negative() && !rounded.is_zero() {
            write!(f, "-${:.2}", rounded.abs())
        } else {
            write!(f, "${:.2}", rounded.abs())
        }
    }
}

/// Errors that can occur when building a [`TaxRate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxRateError {
    /// The rate is below zero.
    #[error("tax rate cannot be negative (got {0})")]
    Negative(Decimal),
    /// The input is not a decimal number.
    #[error("tax rate must be a decimal fraction such as 0.10 (got {0:?})")]
    Malformed(String),
}

/// A sales tax rate expressed as a fraction (`0.10` is 10 %).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Create a tax rate from a non-negative fraction.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError::Negative`] if `fraction` is below zero.
    pub fn new(fraction: Decimal) -> Result<Self, TaxRateError> {
        if fraction.is_sign_negative() && !fraction.is_zero() {
            return Err(TaxRateError::Negative(fraction));
        }
        Ok(Self(fraction))
    }

    /// A zero tax rate.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// The underlying fraction.
    #[must_use]
    pub const fn fraction(&self) -> Decimal {
        self.0
    }

    /// Tax owed on `subtotal` at this rate, unrounded.
    #[must_use]
    pub fn apply(&self, subtotal: Decimal) -> Decimal {
        subtotal * self.0
    }
}

impl Default for TaxRate {
    /// The register-wide default of 10 %.
    fn default() -> Self {
        Self(Decimal::new(10, 2))
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = TaxRateError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaxRate> for Decimal {
    fn from(rate: TaxRate) -> Self {
        rate.0
    }
}

impl FromStr for TaxRate {
    type Err = TaxRateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fraction =
            Decimal::from_str(s.trim()).map_err(|_| TaxRateError::Malformed(s.to_owned()))?;
        Self::new(fraction)
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.0 * Decimal::ONE_HUNDRED).normalize())
    }
}
