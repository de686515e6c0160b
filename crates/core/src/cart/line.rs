//! Cart lines and their identity keys.

use std::num::NonZeroU32;

use serde::Serialize;

use crate::catalog::{Product, requires_variant_selection};
use crate::types::{Price, ProductId};

/// One product at one variant selection and quantity.
///
/// Fields are private: lines only change through [`Cart`](super::Cart)
/// operations, which always produce a new cart.
///
/// Serializes to the storage record layout: the product fields flattened,
/// followed by `quantity`, `selectedSize` and `selectedColor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    #[serde(flatten)]
    product: Product,
    quantity: NonZeroU32,
    #[serde(rename = "selectedSize")]
    selected_size: Option<String>,
    #[serde(rename = "selectedColor")]
    selected_color: Option<String>,
}

impl CartLine {
    pub(crate) const fn new(
        product: Product,
        quantity: NonZeroU32,
        selected_size: Option<String>,
        selected_color: Option<String>,
    ) -> Self {
        Self {
            product,
            quantity,
            selected_size,
            selected_color,
        }
    }

    /// The product snapshot taken when the line was created.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    #[must_use]
    pub const fn unit_price(&self) -> Price {
        self.product.price
    }

    /// Quantity, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    #[must_use]
    pub fn selected_size(&self) -> Option<&str> {
        self.selected_size.as_deref()
    }

    #[must_use]
    pub fn selected_color(&self) -> Option<&str> {
        self.selected_color.as_deref()
    }

    /// The key that decides whether two lines are the same line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::for_selection(
            &self.product,
            self.selected_size.as_deref(),
            self.selected_color.as_deref(),
        )
    }

    /// Exact match on `(product id, size, color)`, whatever the product type.
    #[must_use]
    pub fn has_identity(&self, id: ProductId, size: Option<&str>, color: Option<&str>) -> bool {
        self.product.id == id
            && self.selected_size.as_deref() == size
            && self.selected_color.as_deref() == color
    }

    pub(crate) const fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity;
    }

    pub(crate) const fn add_quantity(&mut self, extra: NonZeroU32) {
        self.quantity = self.quantity.saturating_add(extra.get());
    }

    pub(crate) fn set_size(&mut self, size: Option<String>) {
        self.selected_size = size;
    }

    pub(crate) fn set_color(&mut self, color: Option<String>) {
        self.selected_color = color;
    }
}

/// Identity of a cart line.
///
/// Products that need a size or color choice are keyed by the full
/// selection; everything else is keyed by product id alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LineKey {
    /// A product without selectable variants.
    Product(ProductId),
    /// A product at a specific size/color selection.
    Variant {
        product_id: ProductId,
        size: Option<String>,
        color: Option<String>,
    },
}

impl LineKey {
    /// Key for adding `product` with the given selection.
    #[must_use]
    pub fn for_selection(product: &Product, size: Option<&str>, color: Option<&str>) -> Self {
        if requires_variant_selection(product) {
            Self::Variant {
                product_id: product.id,
                size: normalize_option(size),
                color: normalize_option(color),
            }
        } else {
            Self::Product(product.id)
        }
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::Product(id) | Self::Variant { product_id: id, .. } => *id,
        }
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Product(id) => write!(f, "{id}"),
            Self::Variant {
                product_id,
                size,
                color,
            } => write!(
                f,
                "{product_id}-{}-{}",
                size.as_deref().unwrap_or("none"),
                color.as_deref().unwrap_or("none")
            ),
        }
    }
}

/// How one option field changes in [`Cart::update_item_options`](super::Cart::update_item_options).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OptionUpdate {
    /// Leave the stored value as it is.
    #[default]
    Keep,
    /// Unset the stored value.
    Clear,
    /// Replace the stored value.
    Set(String),
}

impl OptionUpdate {
    /// Replace with `value`; a blank value clears.
    #[must_use]
    pub fn set(value: impl Into<String>) -> Self {
        normalize_option(Some(&value.into())).map_or(Self::Clear, Self::Set)
    }

    pub(crate) fn apply(&self, current: Option<&str>) -> Option<String> {
        match self {
            Self::Keep => current.map(str::to_owned),
            Self::Clear => None,
            Self::Set(value) => Some(value.clone()),
        }
    }
}

/// Changes to a line's size and color selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionsPatch {
    pub size: OptionUpdate,
    pub color: OptionUpdate,
}

impl OptionsPatch {
    /// Patch that only touches the size.
    #[must_use]
    pub fn size(update: OptionUpdate) -> Self {
        Self {
            size: update,
            color: OptionUpdate::Keep,
        }
    }

    /// Patch that only touches the color.
    #[must_use]
    pub fn color(update: OptionUpdate) -> Self {
        Self {
            size: OptionUpdate::Keep,
            color: update,
        }
    }
}

/// Trim an option value; blank means unset.
pub(crate) fn normalize_option(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
