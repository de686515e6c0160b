//! Cart serialization for durable client-side storage.
//!
//! The stored form is a JSON array of flat records:
//!
//! ```json
//! [{"id": 1, "title": "Atlas Tee", "description": "", "price": "120",
//!   "product_type": "TSHIRT", "available_sizes": "S,M,L",
//!   "images": [{"image": "/black.jpg", "color": "Black"}],
//!   "quantity": 2, "selectedSize": "M", "selectedColor": "Black"}]
//! ```
//!
//! Restoring never fails on a badly shaped record. Each field falls back to
//! its default on its own; only records without a usable `id` are dropped.

use std::num::NonZeroU32;

use serde_json::{Map, Value};

use super::line::normalize_option;
use super::{Cart, CartError, CartLine, coalesce};
use crate::catalog::{Product, ProductImage, ProductType};
use crate::types::{Price, ProductId};

/// Key of the storage record holding the cart.
pub const STORAGE_KEY: &str = "cart";

impl Cart {
    /// Serialize the full cart to its storage representation.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Serialize`] if JSON encoding fails.
    pub fn serialize(&self) -> Result<String, CartError> {
        serde_json::to_string(&self.lines).map_err(CartError::Serialize)
    }

    /// Rebuild a cart from its storage representation.
    ///
    /// # Errors
    ///
    /// Returns an error only when `raw` is not JSON or not a JSON array.
    /// Malformed records inside the array degrade field by field.
    pub fn deserialize(raw: &str) -> Result<Self, CartError> {
        let value: Value = serde_json::from_str(raw).map_err(CartError::Parse)?;
        let Value::Array(records) = value else {
            return Err(CartError::NotAList);
        };

        let lines = records.iter().filter_map(restore_line).collect();
        Ok(Self {
            lines: coalesce(lines),
        })
    }
}

fn restore_line(record: &Value) -> Option<CartLine> {
    let fields = record.as_object()?;
    let id = fields.get("id").and_then(restore_id)?;

    let product = Product {
        id,
        title: text_field(fields, "title").unwrap_or_default(),
        description: text_field(fields, "description").unwrap_or_default(),
        price: fields
            .get("price")
            .and_then(|v| Price::from_json(v).ok())
            .unwrap_or(Price::ZERO),
        product_type: fields
            .get("product_type")
            .and_then(|v| serde_json::from_value::<ProductType>(v.clone()).ok())
            .unwrap_or_default(),
        available_sizes: text_field(fields, "available_sizes"),
        images: match fields.get("images") {
            Some(Value::Array(items)) => items.iter().filter_map(restore_image).collect(),
            _ => Vec::new(),
        },
    };

    let quantity = fields
        .get("quantity")
        .and_then(restore_quantity)
        .unwrap_or(NonZeroU32::MIN);

    Some(CartLine::new(
        product,
        quantity,
        normalize_option(fields.get("selectedSize").and_then(Value::as_str)),
        normalize_option(fields.get("selectedColor").and_then(Value::as_str)),
    ))
}

fn restore_id(value: &Value) -> Option<ProductId> {
    match value {
        Value::Number(n) => n.as_i64().map(ProductId::new),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn restore_quantity(value: &Value) -> Option<NonZeroU32> {
    let whole = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 1.0).map(truncate)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    NonZeroU32::new(u32::try_from(whole).unwrap_or(u32::MAX))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Caller checks finite and >= 1
fn truncate(value: f64) -> u64 {
    value as u64
}

fn restore_image(value: &Value) -> Option<ProductImage> {
    let fields = value.as_object()?;
    let url = text_field(fields, "image")?;
    Some(ProductImage {
        url,
        color: text_field(fields, "color"),
    })
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    fn tee() -> Product {
        Product::new(
            ProductId::new(1),
            "Atlas Tee",
            Price::parse("120.00").unwrap(),
            ProductType::Tshirt,
        )
        .with_sizes("S,M,L")
        .with_description("Heavy cotton")
        .with_images(vec![ProductImage::with_color("/black.jpg", "Black")])
    }

    #[test]
    fn test_round_trip_preserves_lines() {
        let tote = Product::new(
            ProductId::new(2),
            "Souk Tote",
            Price::parse("50").unwrap(),
            ProductType::Totebag,
        );
        let cart = Cart::new()
            .add_item(&tee(), Some("M"), Some("Black"))
            .add_item(&tee(), Some("M"), Some("Black"))
            .add_item(&tote, None, None);

        let restored = Cart::deserialize(&cart.serialize().unwrap()).unwrap();
        assert_eq!(restored, cart);
        assert_eq!(restored.lines()[0].quantity(), 2);
        assert_eq!(restored.lines()[0].selected_size(), Some("M"));
    }

    #[test]
    fn test_serialized_layout_uses_storage_field_names() {
        let cart = Cart::new().add_item(&tee(), Some("S"), None);
        let value: Value = serde_json::from_str(&cart.serialize().unwrap()).unwrap();
        let record = &value[0];

        assert_eq!(record["id"], json!(1));
        assert_eq!(record["product_type"], json!("TSHIRT"));
        assert_eq!(record["images"][0]["image"], json!("/black.jpg"));
        assert_eq!(record["quantity"], json!(1));
        assert_eq!(record["selectedSize"], json!("S"));
        assert_eq!(record["selectedColor"], Value::Null);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let raw = json!([{ "id": 5, "title": "Tote", "price": 40 }]).to_string();
        let cart = Cart::deserialize(&raw).unwrap();
        let line = &cart.lines()[0];

        assert!(line.product().images.is_empty());
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.selected_size(), None);
        assert_eq!(line.selected_color(), None);
        assert_eq!(line.unit_price().amount(), Decimal::new(40, 0));
    }

    #[test]
    fn test_malformed_fields_degrade_individually() {
        let raw = json!([{
            "id": "7",
            "title": 12,
            "price": "free",
            "product_type": "HAT",
            "images": "not-a-list",
            "quantity": 0,
            "selectedSize": "",
            "selectedColor": false
        }])
        .to_string();

        let cart = Cart::deserialize(&raw).unwrap();
        let line = &cart.lines()[0];
        assert_eq!(line.product_id(), ProductId::new(7));
        assert!(line.product().title.is_empty());
        assert_eq!(line.unit_price(), Price::ZERO);
        assert_eq!(line.product().product_type, ProductType::Other);
        assert!(line.product().images.is_empty());
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.selected_size(), None);
        assert_eq!(line.selected_color(), None);
    }

    #[test]
    fn test_records_without_id_are_dropped() {
        let raw = json!([42, {"title": "no id"}, {"id": 3, "quantity": 2.0}]).to_string();
        let cart = Cart::deserialize(&raw).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity(), 2);
    }

    #[test]
    fn test_unreadable_storage_is_an_error() {
        assert!(matches!(Cart::deserialize("{oops"), Err(CartError::Parse(_))));
        assert!(matches!(
            Cart::deserialize("{\"cart\": []}"),
            Err(CartError::NotAList)
        ));
        assert!(Cart::deserialize("[]").unwrap().is_empty());
    }
}
