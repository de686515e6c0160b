//! Shipping policies.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::PricingError;
use crate::types::Price;

/// Selector that sets the fallback amount in [`ShippingRules::parse`].
const FALLBACK_SELECTOR: &str = "other";

/// City selector to flat shipping amount, with a fallback.
///
/// Selectors are compared trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingRules {
    rates: BTreeMap<String, Decimal>,
    fallback: Decimal,
}

impl ShippingRules {
    /// Rules with no cities, charging `fallback` everywhere.
    #[must_use]
    pub const fn new(fallback: Decimal) -> Self {
        Self {
            rates: BTreeMap::new(),
            fallback,
        }
    }

    /// Add or replace the rate for a city.
    #[must_use]
    pub fn with_rate(mut self, city: &str, amount: Decimal) -> Self {
        self.rates.insert(selector(city), amount);
        self
    }

    /// Replace the fallback amount.
    #[must_use]
    pub const fn with_fallback(mut self, fallback: Decimal) -> Self {
        self.fallback = fallback;
        self
    }

    /// Parse `city=amount` pairs separated by commas.
    ///
    /// The `other` selector sets the fallback; without it the fallback is 0.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is not `city=amount` or the amount is not
    /// a valid non-negative number.
    pub fn parse(table: &str) -> Result<Self, PricingError> {
        let mut rules = Self::new(Decimal::ZERO);
        for entry in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let Some((city, amount)) = entry.split_once('=') else {
                return Err(PricingError::MalformedRule(entry.to_owned()));
            };
            let city = selector(city);
            if city.is_empty() {
                return Err(PricingError::MalformedRule(entry.to_owned()));
            }
            let amount = Price::parse(amount)
                .map_err(|source| PricingError::InvalidAmount {
                    city: city.clone(),
                    source,
                })?
                .amount();

            if city == FALLBACK_SELECTOR {
                rules.fallback = amount;
            } else {
                rules.rates.insert(city, amount);
            }
        }
        Ok(rules)
    }

    /// Amount charged for a city; empty or unknown cities pay the fallback.
    #[must_use]
    pub fn amount_for(&self, city: &str) -> Decimal {
        self.rates
            .get(&selector(city))
            .copied()
            .unwrap_or(self.fallback)
    }

    #[must_use]
    pub const fn fallback(&self) -> Decimal {
        self.fallback
    }

    /// Configured cities and their amounts, in selector order.
    pub fn rates(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.rates.iter().map(|(city, amount)| (city.as_str(), *amount))
    }
}

/// How shipping is charged at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShippingPolicy {
    /// Same amount for every destination.
    Flat(Decimal),
    /// Amount looked up from the selected city.
    ByCity(ShippingRules),
}

impl ShippingPolicy {
    /// Free shipping everywhere.
    #[must_use]
    pub const fn free() -> Self {
        Self::Flat(Decimal::ZERO)
    }

    /// Shipping charged for the selected city.
    #[must_use]
    pub fn shipping_for(&self, city: &str) -> Decimal {
        match self {
            Self::Flat(amount) => *amount,
            Self::ByCity(rules) => rules.amount_for(city),
        }
    }
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self::free()
    }
}

fn selector(city: &str) -> String {
    city.trim().to_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_city_lookup_and_fallback() {
        let rules = ShippingRules::parse("casablanca=35, rabat=40, other=50").unwrap();
        let policy = ShippingPolicy::ByCity(rules);

        assert_eq!(policy.shipping_for("casablanca"), Decimal::new(35, 0));
        assert_eq!(policy.shipping_for("  Rabat "), Decimal::new(40, 0));
        assert_eq!(policy.shipping_for(""), Decimal::new(50, 0));
        assert_eq!(policy.shipping_for("Tangier"), Decimal::new(50, 0));
    }

    #[test]
    fn test_fixed_zero_policy() {
        let policy = ShippingPolicy::free();
        assert_eq!(policy.shipping_for("casablanca"), Decimal::ZERO);
        assert_eq!(policy.shipping_for(""), Decimal::ZERO);
    }

    #[test]
    fn test_fallback_defaults_to_zero() {
        let rules = ShippingRules::parse("casablanca=35").unwrap();
        assert_eq!(rules.fallback(), Decimal::ZERO);
        assert_eq!(
            rules.rates().collect::<Vec<_>>(),
            vec![("casablanca", Decimal::new(35, 0))]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ShippingRules::parse("casablanca"),
            Err(PricingError::MalformedRule(_))
        ));
        assert!(matches!(
            ShippingRules::parse("=35"),
            Err(PricingError::MalformedRule(_))
        ));
        assert!(matches!(
            ShippingRules::parse("fes=cheap"),
            Err(PricingError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_builder() {
        let rules = ShippingRules::new(Decimal::ZERO)
            .with_rate("Casablanca", Decimal::new(35, 0))
            .with_fallback(Decimal::new(50, 0));
        assert_eq!(rules.amount_for("CASABLANCA"), Decimal::new(35, 0));
        assert_eq!(rules.amount_for("Fes"), Decimal::new(50, 0));
    }
}
