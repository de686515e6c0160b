//! Product records and catalog ingestion.

use serde::{Deserialize, Serialize};

use crate::types::{Price, PriceError, ProductId};

/// Kind of product sold by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductType {
    /// T-shirts; the only type with selectable sizes.
    #[serde(rename = "TSHIRT")]
    Tshirt,
    /// Tote bags.
    #[serde(rename = "TOTEBAG")]
    Totebag,
    /// Anything the catalog adds later.
    #[default]
    #[serde(rename = "OTHER", other)]
    Other,
}

impl ProductType {
    /// Wire name used by the catalog API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tshirt => "TSHIRT",
            Self::Totebag => "TOTEBAG",
            Self::Other => "OTHER",
        }
    }
}

/// A product image, optionally tagged with the color it shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Image path or URL as sent by the catalog.
    #[serde(rename = "image")]
    pub url: String,
    /// Color shown in this image, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ProductImage {
    /// Create an image without a color tag.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            color: None,
        }
    }

    /// Create an image tagged with a color.
    #[must_use]
    pub fn with_color(url: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            color: Some(color.into()),
        }
    }
}

/// A product record exactly as the catalog API sends it.
///
/// `price` may be a JSON string or number; everything except `id`, `title`
/// and `price` may be missing or `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: serde_json::Value,
    #[serde(default)]
    pub product_type: ProductType,
    #[serde(default)]
    pub available_sizes: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<ProductImage>>,
}

/// A normalized catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub product_type: ProductType,
    /// Comma-separated size list; only meaningful for t-shirts.
    pub available_sizes: Option<String>,
    pub images: Vec<ProductImage>,
}

impl Product {
    /// Create a product with no sizes and no images.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        price: Price,
        product_type: ProductType,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            price,
            product_type,
            available_sizes: None,
            images: Vec::new(),
        }
    }

    /// Set the comma-separated size list.
    #[must_use]
    pub fn with_sizes(mut self, sizes: impl Into<String>) -> Self {
        self.available_sizes = Some(sizes.into());
        self
    }

    /// Set the image list.
    #[must_use]
    pub fn with_images(mut self, images: Vec<ProductImage>) -> Self {
        self.images = images;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl TryFrom<RawProduct> for Product {
    type Error = PriceError;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        let price = Price::from_json(&raw.price)?;
        Ok(Self {
            id: raw.id,
            title: raw.title,
            description: raw.description.unwrap_or_default(),
            price,
            product_type: raw.product_type,
            available_sizes: raw.available_sizes,
            images: raw.images.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_ingest_string_price() {
        let raw: RawProduct = serde_json::from_value(serde_json::json!({
            "id": 3,
            "title": "Zellige Tee",
            "description": "Cotton tee",
            "price": "120.00",
            "product_type": "TSHIRT",
            "available_sizes": "S, M, L",
            "images": [{"image": "/media/zellige-black.jpg", "color": "Black"}]
        }))
        .unwrap();

        let product = Product::try_from(raw).unwrap();
        assert_eq!(product.price.amount(), Decimal::new(120, 0));
        assert_eq!(product.product_type, ProductType::Tshirt);
        assert_eq!(product.images[0].color.as_deref(), Some("Black"));
    }

    #[test]
    fn test_ingest_numeric_price_and_missing_fields() {
        let raw: RawProduct = serde_json::from_value(serde_json::json!({
            "id": 9,
            "title": "Souk Tote",
            "price": 50,
            "product_type": "TOTEBAG",
            "images": null
        }))
        .unwrap();

        let product = Product::try_from(raw).unwrap();
        assert_eq!(product.price.amount(), Decimal::new(50, 0));
        assert!(product.images.is_empty());
        assert!(product.description.is_empty());
        assert!(product.available_sizes.is_none());
    }

    #[test]
    fn test_ingest_rejects_bad_price() {
        let raw: RawProduct = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Broken",
            "price": "call us",
            "product_type": "TOTEBAG"
        }))
        .unwrap();
        assert!(Product::try_from(raw).is_err());
    }

    #[test]
    fn test_unknown_product_type() {
        let raw: RawProduct = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Mug",
            "price": "30",
            "product_type": "MUG"
        }))
        .unwrap();
        assert_eq!(raw.product_type, ProductType::Other);
    }
}
