//! Shopping cart: ordered lines keyed by product and variant selection.
//!
//! [`Cart`] is a value. Every operation borrows the current cart and returns
//! the next one, so a caller holding an older snapshot never sees it change.
//!
//! # Invariants
//!
//! - No two lines share a [`LineKey`].
//! - Every line has a quantity of at least 1.
//! - Lines keep insertion order; updates happen in place.

mod line;
mod storage;

use std::num::NonZeroU32;

use thiserror::Error;

use crate::catalog::{Product, requires_variant_selection};
use crate::types::ProductId;

pub use line::{CartLine, LineKey, OptionUpdate, OptionsPatch};
pub use storage::STORAGE_KEY;

use line::normalize_option;

/// Errors from restoring or persisting a cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// Stored cart is not valid JSON.
    #[error("stored cart is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// Stored cart is JSON but not a list of lines.
    #[error("stored cart is not a list of lines")]
    NotAList,

    /// Cart could not be written as JSON.
    #[error("failed to serialize cart: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// An ordered collection of cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity())).sum()
    }

    /// Find a line by its identity key.
    #[must_use]
    pub fn find(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.key() == key)
    }

    /// Add one unit of `product` with the given selection.
    ///
    /// A product that needs a variant choice matches an existing line only on
    /// the exact `(id, size, color)` selection. Any other product matches on
    /// id alone; a size or color passed for it is stored on a new line but
    /// never used for matching, so a second add with different options lands
    /// on the first line.
    ///
    /// On a match the quantity goes up by one and each supplied option
    /// overwrites the stored one. Otherwise a new line with quantity 1 is
    /// appended.
    #[must_use]
    pub fn add_item(&self, product: &Product, size: Option<&str>, color: Option<&str>) -> Self {
        let size = normalize_option(size);
        let color = normalize_option(color);
        let needs_variant = requires_variant_selection(product);

        let mut lines = self.lines.clone();
        let existing = lines.iter_mut().find(|line| {
            line.product_id() == product.id
                && (!needs_variant
                    || (line.selected_size() == size.as_deref()
                        && line.selected_color() == color.as_deref()))
        });

        match existing {
            Some(line) => {
                line.add_quantity(NonZeroU32::MIN);
                if size.is_some() {
                    line.set_size(size);
                }
                if color.is_some() {
                    line.set_color(color);
                }
            }
            None => lines.push(CartLine::new(product.clone(), NonZeroU32::MIN, size, color)),
        }

        Self { lines }
    }

    /// Set the quantity of the line with exactly this `(id, size, color)`.
    ///
    /// A quantity below 1 removes the line. No matching line is a no-op.
    #[must_use]
    pub fn update_quantity(
        &self,
        id: ProductId,
        quantity: i64,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Self {
        let clamped = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
        let Some(quantity) = NonZeroU32::new(clamped) else {
            return self.remove_item(id, size, color);
        };

        let size = normalize_option(size);
        let color = normalize_option(color);
        let mut lines = self.lines.clone();
        if let Some(line) = lines
            .iter_mut()
            .find(|l| l.has_identity(id, size.as_deref(), color.as_deref()))
        {
            line.set_quantity(quantity);
        }
        Self { lines }
    }

    /// Remove the line with exactly this `(id, size, color)`, if present.
    #[must_use]
    pub fn remove_item(&self, id: ProductId, size: Option<&str>, color: Option<&str>) -> Self {
        let size = normalize_option(size);
        let color = normalize_option(color);
        let lines = self
            .lines
            .iter()
            .filter(|l| !l.has_identity(id, size.as_deref(), color.as_deref()))
            .cloned()
            .collect();
        Self { lines }
    }

    /// Change the size/color of every line for `id`, keeping quantities.
    ///
    /// Lines are matched by product id only. If the new selection makes two
    /// lines share a key they are folded into the first one.
    #[must_use]
    pub fn update_item_options(&self, id: ProductId, patch: &OptionsPatch) -> Self {
        let lines = self
            .lines
            .iter()
            .cloned()
            .map(|mut line| {
                if line.product_id() == id {
                    let size = patch.size.apply(line.selected_size());
                    let color = patch.color.apply(line.selected_color());
                    line.set_size(size);
                    line.set_color(color);
                }
                line
            })
            .collect();
        Self {
            lines: coalesce(lines),
        }
    }

    /// Fold `other` into this cart, summing quantities of matching lines.
    ///
    /// Lines new to this cart are appended in `other`'s order.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let lines = self.lines.iter().chain(other.lines.iter()).cloned().collect();
        Self {
            lines: coalesce(lines),
        }
    }

    /// An empty cart.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn clear(&self) -> Self {
        Self::new()
    }
}

/// Merge lines that share a key, keeping the first position.
fn coalesce(lines: Vec<CartLine>) -> Vec<CartLine> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines {
        let key = line.key();
        match merged.iter_mut().find(|m| m.key() == key) {
            Some(existing) => existing.add_quantity(line_quantity(&line)),
            None => merged.push(line),
        }
    }
    merged
}

fn line_quantity(line: &CartLine) -> NonZeroU32 {
    NonZeroU32::new(line.quantity()).unwrap_or(NonZeroU32::MIN)
}
