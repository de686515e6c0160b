//! Cart pricing: line totals, subtotal, shipping, and grand total.
//!
//! All arithmetic is exact decimal arithmetic. Amounts are rounded to cents
//! only when rendered (see [`CurrencyCode::format`]), never in between, so
//! recomputing totals after every cart change cannot drift.

mod shipping;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::cart::{Cart, CartLine};
use crate::types::{CurrencyCode, PriceError};

pub use shipping::{ShippingPolicy, ShippingRules};

/// Errors from building pricing configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A shipping rule entry is not `city=amount`.
    #[error("malformed shipping rule: {0:?}")]
    MalformedRule(String),

    /// A shipping rule amount is not a valid price.
    #[error("invalid shipping amount for {city}: {source}")]
    InvalidAmount {
        city: String,
        #[source]
        source: PriceError,
    },

    /// Exchange rates must be strictly positive.
    #[error("exchange rate must be positive, got {0}")]
    NonPositiveRate(Decimal),
}

/// Unit price times quantity.
#[must_use]
pub fn line_total(line: &CartLine) -> Decimal {
    line.unit_price().amount() * Decimal::from(line.quantity())
}

/// Sum of all line totals.
#[must_use]
pub fn subtotal(cart: &Cart) -> Decimal {
    cart.lines().iter().map(line_total).sum()
}

/// Shipping charged for the selected city under `policy`.
#[must_use]
pub fn shipping(city: &str, policy: &ShippingPolicy) -> Decimal {
    policy.shipping_for(city)
}

/// Subtotal plus shipping for the selected city.
#[must_use]
pub fn total(cart: &Cart, city: &str, policy: &ShippingPolicy) -> Decimal {
    subtotal(cart) + shipping(city, policy)
}

/// Shorthand for [`CartTotals::compute`].
#[must_use]
pub fn totals(cart: &Cart, city: &str, policy: &ShippingPolicy) -> CartTotals {
    CartTotals::compute(cart, city, policy)
}

/// Render an amount in the store currency, e.g. `290.00 DHS`.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    CurrencyCode::MAD.format(amount)
}

/// Every figure the cart and checkout views show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub item_count: u64,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Price a cart for the selected city.
    #[must_use]
    pub fn compute(cart: &Cart, city: &str, policy: &ShippingPolicy) -> Self {
        let subtotal = subtotal(cart);
        let shipping = shipping(city, policy);
        Self {
            item_count: cart.item_count(),
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    /// Rendered `(subtotal, shipping, total)` in the store currency.
    #[must_use]
    pub fn formatted(&self) -> (String, String, String) {
        (
            format_amount(self.subtotal),
            format_amount(self.shipping),
            format_amount(self.total),
        )
    }
}

/// Fixed conversion rate from the store currency to US dollars.
///
/// `rate` is how many dirhams make one dollar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    /// # Errors
    ///
    /// Returns [`PricingError::NonPositiveRate`] for zero or negative rates.
    pub fn new(rate: Decimal) -> Result<Self, PricingError> {
        if rate <= Decimal::ZERO {
            return Err(PricingError::NonPositiveRate(rate));
        }
        Ok(Self(rate))
    }

    #[must_use]
    pub const fn rate(&self) -> Decimal {
        self.0
    }

    /// Convert a store-currency amount to dollars (unrounded).
    #[must_use]
    pub fn to_usd(&self, amount: Decimal) -> Decimal {
        amount / self.0
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self(Decimal::TEN)
    }
}
