//! Non-negative monetary amounts.
//!
//! Never use floating-point for money. `Amount` wraps `rust_decimal::Decimal`
//! and can only be built from a value that is zero or positive and fits the
//! `NUMERIC(15, 2)` money columns, so a service record's gross value is
//! valid once constructed.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Digits allowed after the decimal point.
pub const AMOUNT_SCALE: u32 = 2;

/// Digits allowed before the decimal point.
pub const AMOUNT_INTEGER_DIGITS: u32 = 13;

/// Rejected amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The value was below zero.
    #[error("amount must not be negative (got {0})")]
    Negative(Decimal),

    /// More than two decimal places.
    #[error("amount must have at most 2 decimal places (got {0})")]
    TooPrecise(Decimal),

    /// More than thirteen integer digits.
    #[error("amount must have at most 13 integer digits (got {0})")]
    TooLarge(Decimal),
}

/// A monetary amount that is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Builds an amount, rejecting values the money columns cannot hold.
    ///
    /// Trailing zeros do not count as decimal places, so `12.300` is accepted.
    ///
    /// # Errors
    ///
    /// - `AmountError::Negative` when `value < 0`
    /// - `AmountError::TooPrecise` for a third significant decimal place
    /// - `AmountError::TooLarge` when `value >= 10^13`
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        if value.normalize().scale() > AMOUNT_SCALE {
            return Err(AmountError::TooPrecise(value));
        }
        if value.trunc() >= Decimal::from(10_i64.pow(AMOUNT_INTEGER_DIGITS)) {
            return Err(AmountError::TooLarge(value));
        }
        Ok(Self(value))
    }

    /// Returns the inner decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
