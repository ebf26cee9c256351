//! Money amounts in integer minor units.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are stored as signed `i64` minor units (centavos, cents) so that
//! split totals compare with exact equality. Decimal text coming from bank
//! files is parsed through `rust_decimal::Decimal` and converted without
//! rounding.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of minor units per major unit for every supported currency.
const MINOR_SCALE: u32 = 2;

/// Errors produced when converting text or decimals into an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    /// The input was empty after trimming currency symbols and whitespace.
    #[error("Amount is empty")]
    Empty,

    /// The input is not a number.
    #[error("Invalid amount: {0}")]
    Invalid(String),

    /// The input carries precision below one minor unit.
    #[error("Amount {0} has more than two decimal places")]
    SubMinorPrecision(Decimal),

    /// The value does not fit into 64-bit minor units.
    #[error("Amount {0} is out of range")]
    OutOfRange(Decimal),
}

/// A signed monetary amount in minor units.
///
/// Credits are positive, debits negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Converts an exact decimal into minor units.
    ///
    /// # Errors
    ///
    /// Returns an error if the decimal has sub-cent precision or overflows.
    pub fn from_decimal(value: Decimal) -> Result<Self, AmountParseError> {
        let scaled = value * Decimal::from(10_i64.pow(MINOR_SCALE));
        if !scaled.fract().is_zero() {
            return Err(AmountParseError::SubMinorPrecision(value));
        }
        scaled
            .to_i64()
            .map(Self)
            .ok_or(AmountParseError::OutOfRange(value))
    }

    /// Returns the amount as a decimal in major units.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_SCALE)
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns true if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns the absolute amount.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Sums an iterator of amounts, returning `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.to_decimal())
    }
}

/// Parses plain (`1234.56`) and Brazilian (`R$ 1.234,56`) notations.
///
/// When a comma is present it is the decimal separator and dots are
/// thousands separators.
impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s
            .replace("R$", "")
            .replace("r$", "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let normalized = if cleaned.contains(',') {
            cleaned.replace('.', "").replacen(',', ".", 1)
        } else {
            cleaned
        };

        let value = Decimal::from_str(&normalized)
            .map_err(|_| AmountParseError::Invalid(s.trim().to_string()))?;
        Self::from_decimal(value)
    }
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Brazilian Real
    #[default]
    Brl,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Brl => write!(f, "BRL"),
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BRL" => Ok(Self::Brl),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
