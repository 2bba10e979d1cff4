//! Listing price in whole currency units.
//!
//! Prices are currency agnostic integers (the storefront displays them as
//! hryvnia). A listing price is always strictly positive; derived totals are
//! plain non-negative integers because an empty cart totals zero.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is zero or negative.
    #[error("price must be positive (got {0})")]
    NotPositive(i64),
}

/// A strictly positive listing price.
///
/// ```
/// use teslix_core::Price;
///
/// let price = Price::new(4500).unwrap();
/// assert_eq!(price.line_total(2), 9000);
/// assert!(Price::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Price(i64);

impl Price {
    /// Create a price, rejecting zero and negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotPositive`] if `amount <= 0`.
    pub const fn new(amount: i64) -> Result<Self, PriceError> {
        if amount <= 0 {
            return Err(PriceError::NotPositive(amount));
        }
        Ok(Self(amount))
    }

    /// The amount in whole currency units.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Price multiplied by a quantity, saturating on overflow.
    #[must_use]
    pub fn line_total(self, quantity: u32) -> i64 {
        self.0.saturating_mul(i64::from(quantity))
    }
}

impl TryFrom<i64> for Price {
    type Error = PriceError;

    fn try_from(amount: i64) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Format an amount with space-separated thousands and the hryvnia sign,
/// e.g. `45 900 ₴`.
#[must_use]
pub fn format_hryvnia(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{grouped} ₴")
    } else {
        format!("{grouped} ₴")
    }
}
