//! Order payload construction and order-intake response interpretation.
//!
//! An [`OrderDraft`] can only be prepared from a valid form and a non-empty
//! cart. The draft renders into an [`OrderPayload`], the JSON body posted to
//! the order-intake endpoint.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::cart::{Cart, CartLine};
use crate::checkout::{CheckoutError, CheckoutForm, validate_form};
use crate::pricing::{CartTotals, ExchangeRate, ShippingPolicy, format_amount, line_total};
use crate::types::{CurrencyCode, ProductId};

/// One cart line as it appears in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub title: String,
    pub quantity: u32,
    /// Unit price in the store currency, 2 dp.
    pub unit_price: String,
    /// Unit price converted to dollars, 2 dp.
    pub unit_price_usd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Line total in the store currency, 2 dp.
    pub line_total: String,
    #[serde(skip)]
    total: Decimal,
}

impl OrderLine {
    fn render(line: &CartLine, rate: ExchangeRate) -> Self {
        let unit = line.unit_price().amount();
        let total = line_total(line);
        Self {
            product_id: line.product_id(),
            title: line.product().title.clone(),
            quantity: line.quantity(),
            unit_price: CurrencyCode::plain(unit),
            unit_price_usd: CurrencyCode::plain(rate.to_usd(unit)),
            size: line.selected_size().map(str::to_owned),
            color: line.selected_color().map(str::to_owned),
            line_total: CurrencyCode::plain(total),
            total,
        }
    }

    /// Human-readable line, e.g. `Atlas Tee (2) - Size: M - Color: Black 240.00 DHS`.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut text = format!("{} ({})", self.title, self.quantity);
        if let Some(size) = &self.size {
            text.push_str(" - Size: ");
            text.push_str(size);
        }
        if let Some(color) = &self.color {
            text.push_str(" - Color: ");
            text.push_str(color);
        }
        text.push(' ');
        text.push_str(&format_amount(self.total));
        text
    }
}

/// Amounts converted for the payment breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsdBreakdown {
    pub currency_code: &'static str,
    pub item_total: String,
    pub shipping: String,
    pub total: String,
}

/// The JSON body posted to the order-intake endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPayload {
    pub reference: Uuid,
    pub placed_at: DateTime<Utc>,
    #[serde(rename = "_subject")]
    pub subject: String,
    #[serde(flatten)]
    pub contact: CheckoutForm,
    pub items: Vec<OrderLine>,
    /// Plain-text rendering of the order for humans reading the intake inbox.
    pub summary: String,
    pub currency_code: &'static str,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
    pub usd: UsdBreakdown,
}

/// A validated order, ready to be rendered into a payload.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    contact: CheckoutForm,
    lines: Vec<OrderLine>,
    totals: CartTotals,
    rate: ExchangeRate,
}

impl OrderDraft {
    /// Validate the form against the cart and capture everything the order
    /// needs. Totals are priced here from the cart and the form's city.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty cart and
    /// [`CheckoutError::InvalidForm`] when any field fails validation.
    pub fn prepare(
        form: &CheckoutForm,
        cart: &Cart,
        policy: &ShippingPolicy,
        rate: ExchangeRate,
    ) -> Result<Self, CheckoutError> {
        let validation = validate_form(form, cart);
        if validation.cart_is_empty {
            return Err(CheckoutError::EmptyCart);
        }
        if !validation.is_valid {
            return Err(CheckoutError::InvalidForm(
                validation.field_errors.into_values().collect(),
            ));
        }

        Ok(Self {
            contact: trimmed(form),
            lines: cart
                .lines()
                .iter()
                .map(|line| OrderLine::render(line, rate))
                .collect(),
            totals: CartTotals::compute(cart, &form.city, policy),
            rate,
        })
    }

    #[must_use]
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    #[must_use]
    pub const fn totals(&self) -> &CartTotals {
        &self.totals
    }

    /// Plain-text order summary: one line per item, then the three totals.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut rows: Vec<String> = self.lines.iter().map(OrderLine::describe).collect();
        rows.push(format!("Subtotal: {}", format_amount(self.totals.subtotal)));
        rows.push(format!("Shipping: {}", format_amount(self.totals.shipping)));
        rows.push(format!("Total: {}", format_amount(self.totals.total)));
        rows.join("\n")
    }

    /// Render with a fresh reference and the current time.
    #[must_use]
    pub fn into_payload(self, subject: &str) -> OrderPayload {
        self.into_payload_at(subject, Uuid::new_v4(), Utc::now())
    }

    /// Render with a given reference and timestamp.
    #[must_use]
    pub fn into_payload_at(
        self,
        subject: &str,
        reference: Uuid,
        placed_at: DateTime<Utc>,
    ) -> OrderPayload {
        let summary = self.summary();
        let totals = self.totals;
        let rate = self.rate;
        OrderPayload {
            reference,
            placed_at,
            subject: format!(
                "{subject} - {} {}",
                self.contact.first_name, self.contact.last_name
            ),
            contact: self.contact,
            items: self.lines,
            summary,
            currency_code: CurrencyCode::MAD.code(),
            subtotal: CurrencyCode::plain(totals.subtotal),
            shipping: CurrencyCode::plain(totals.shipping),
            total: CurrencyCode::plain(totals.total),
            usd: UsdBreakdown {
                currency_code: CurrencyCode::USD.code(),
                item_total: CurrencyCode::plain(rate.to_usd(totals.subtotal)),
                shipping: CurrencyCode::plain(rate.to_usd(totals.shipping)),
                total: CurrencyCode::plain(rate.to_usd(totals.total)),
            },
        }
    }
}

fn trimmed(form: &CheckoutForm) -> CheckoutForm {
    CheckoutForm {
        first_name: form.first_name.trim().to_owned(),
        last_name: form.last_name.trim().to_owned(),
        email: form.email.trim().to_owned(),
        phone: form.phone.trim().to_owned(),
        address: form.address.trim().to_owned(),
        city: form.city.trim().to_owned(),
        zip_code: form.zip_code.trim().to_owned(),
    }
}

/// Structured reply from the order-intake endpoint.
///
/// Some intake services send `success` as the string `"true"`; both forms
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmissionReply {
    #[serde(deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(flag) => Ok(flag),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean, got {other:?}"
            ))),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::catalog::{Product, ProductType};
    use crate::pricing::ShippingRules;
    use crate::types::Price;

    fn form() -> CheckoutForm {
        CheckoutForm {
            first_name: " Salma ".into(),
            last_name: "Idrissi".into(),
            email: "salma@example.ma".into(),
            phone: "0600000000".into(),
            address: "12 Rue Tarik".into(),
            city: "Casablanca".into(),
            zip_code: "20000".into(),
        }
    }

    fn cart() -> Cart {
        let tee = Product::new(
            ProductId::new(1),
            "Atlas Tee",
            Price::parse("120").unwrap(),
            ProductType::Tshirt,
        )
        .with_sizes("S,M");
        let tote = Product::new(
            ProductId::new(2),
            "Souk Tote",
            Price::parse("50").unwrap(),
            ProductType::Totebag,
        );
        Cart::new()
            .add_item(&tee, Some("M"), None)
            .add_item(&tee, Some("M"), None)
            .add_item(&tote, None, None)
    }

    fn draft() -> OrderDraft {
        let policy = ShippingPolicy::Flat(Decimal::new(35, 0));
        OrderDraft::prepare(&form(), &cart(), &policy, ExchangeRate::default()).unwrap()
    }

    #[test]
    fn test_prepare_refuses_empty_cart_and_bad_form() {
        let free = ShippingPolicy::free();
        assert_eq!(
            OrderDraft::prepare(&form(), &Cart::new(), &free, ExchangeRate::default())
                .unwrap_err(),
            CheckoutError::EmptyCart
        );

        let bad = CheckoutForm {
            email: "nope".into(),
            ..form()
        };
        assert!(matches!(
            OrderDraft::prepare(&bad, &cart(), &free, ExchangeRate::default()),
            Err(CheckoutError::InvalidForm(errors)) if errors.len() == 1
        ));
    }

    #[test]
    fn test_totals_are_priced_from_cart_and_city() {
        let policy = ShippingPolicy::ByCity(
            ShippingRules::new(Decimal::new(50, 0)).with_rate("casablanca", Decimal::new(35, 0)),
        );
        let cart = cart();

        let draft = OrderDraft::prepare(&form(), &cart, &policy, ExchangeRate::default()).unwrap();
        assert_eq!(draft.totals(), &CartTotals::compute(&cart, "Casablanca", &policy));
        assert_eq!(draft.totals().subtotal, Decimal::new(290, 0));
        assert_eq!(draft.totals().shipping, Decimal::new(35, 0));

        let rabat = CheckoutForm {
            city: "Rabat".into(),
            ..form()
        };
        let draft = OrderDraft::prepare(&rabat, &cart, &policy, ExchangeRate::default()).unwrap();
        assert_eq!(draft.totals().shipping, Decimal::new(50, 0));
        assert_eq!(draft.totals().total, Decimal::new(340, 0));
    }

    #[test]
    fn test_line_rendering() {
        let draft = draft();
        let tee = &draft.lines()[0];
        assert_eq!(tee.describe(), "Atlas Tee (2) - Size: M 240.00 DHS");
        assert_eq!(tee.unit_price_usd, "12.00");
        assert_eq!(draft.lines()[1].describe(), "Souk Tote (1) 50.00 DHS");
    }

    #[test]
    fn test_summary_lists_items_then_totals() {
        let summary = draft().summary();
        assert_eq!(
            summary,
            "Atlas Tee (2) - Size: M 240.00 DHS\n\
             Souk Tote (1) 50.00 DHS\n\
             Subtotal: 290.00 DHS\n\
             Shipping: 35.00 DHS\n\
             Total: 325.00 DHS"
        );
    }

    #[test]
    fn test_payload_json_shape() {
        let reference = Uuid::nil();
        let placed_at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let payload = draft().into_payload_at("New order", reference, placed_at);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["_subject"], json!("New order - Salma Idrissi"));
        assert_eq!(value["firstName"], json!("Salma"));
        assert_eq!(value["zipCode"], json!("20000"));
        assert_eq!(value["total"], json!("325.00"));
        assert_eq!(value["usd"]["item_total"], json!("29.00"));
        assert_eq!(value["usd"]["total"], json!("32.50"));
        assert_eq!(value["items"][0]["size"], json!("M"));
        assert!(value["items"][0].get("color").is_none());
        assert_eq!(value["items"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_reply_accepts_bool_or_text() {
        let reply: SubmissionReply = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(reply.success);
        assert_eq!(reply.message, None);

        let reply: SubmissionReply =
            serde_json::from_str(r#"{"success": "false", "message": "Form not activated"}"#)
                .unwrap();
        assert!(!reply.success);
        assert_eq!(reply.message.as_deref(), Some("Form not activated"));

        assert!(serde_json::from_str::<SubmissionReply>(r#"{"success": "maybe"}"#).is_err());
        assert!(serde_json::from_str::<SubmissionReply>(r#"{"message": "hi"}"#).is_err());
    }
}
