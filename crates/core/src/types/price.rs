//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog API sends prices either as JSON strings (`"120.00"`) or as
//! JSON numbers (`120`). Both are normalized into a [`Price`] once, at the
//! ingestion boundary, so pricing code never branches on the wire type.

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when normalizing a price.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input was an empty string.
    #[error("price cannot be empty")]
    Empty,
    /// The input does not look like a number.
    #[error("price is not numeric: {0}")]
    NotNumeric(String),
    /// The input is a number below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A unit price in the store currency.
///
/// Serializes as a decimal string. Deserializes from either a string or a
/// JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Parse a price from numeric-looking text.
    ///
    /// Accepts plain decimals (`"120"`, `" 49.90 "`) and scientific notation.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty, not numeric, or negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| PriceError::NotNumeric(trimmed.to_owned()))?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }

        Ok(Self(amount.normalize()))
    }

    /// Normalize a raw JSON price value (string or number).
    ///
    /// # Errors
    ///
    /// Returns an error for non-numeric strings and for values that are
    /// neither strings nor numbers.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, PriceError> {
        match value {
            serde_json::Value::String(s) => Self::parse(s),
            serde_json::Value::Number(n) => Self::parse(&n.to_string()),
            other => Err(PriceError::NotNumeric(other.to_string())),
        }
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Currencies the storefront displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Moroccan dirham, the store currency.
    #[default]
    MAD,
    /// US dollar, used for the payment breakdown.
    USD,
}

impl CurrencyCode {
    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MAD => "MAD",
            Self::USD => "USD",
        }
    }

    /// Format an amount for display, rounding half away from zero to 2 dp.
    ///
    /// This is the only place amounts are rounded.
    #[must_use]
    pub fn format(self, amount: Decimal) -> String {
        let rounded = round_to_cents(amount);
        match self {
            Self::MAD => format!("{rounded:.2} DHS"),
            Self::USD => format!("${rounded:.2}"),
        }
    }

    /// Plain 2 dp rendering without a currency marker (for payment APIs).
    #[must_use]
    pub fn plain(amount: Decimal) -> String {
        format!("{:.2}", round_to_cents(amount))
    }
}

fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
