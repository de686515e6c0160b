//! Cart review pass: every line must carry the selections its product needs.

use std::collections::BTreeMap;

use crate::cart::{Cart, CartLine, LineKey};
use crate::catalog::{colors_of, sizes_of};

pub const SIZE_REQUIRED: &str = "Size is required for T-shirts";
pub const COLOR_REQUIRED: &str = "Color selection is required";

/// Missing selections on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineErrors {
    pub missing_size: bool,
    pub missing_color: bool,
}

impl LineErrors {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.missing_size && !self.missing_color
    }

    /// Messages to show next to the line.
    #[must_use]
    pub fn messages(&self) -> Vec<&'static str> {
        let mut messages = Vec::new();
        if self.missing_size {
            messages.push(SIZE_REQUIRED);
        }
        if self.missing_color {
            messages.push(COLOR_REQUIRED);
        }
        messages
    }
}

/// Result of the cart-review pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartReview {
    /// Only lines with at least one error appear here.
    pub line_errors: BTreeMap<LineKey, LineErrors>,
    pub cart_is_empty: bool,
    /// No line errors.
    pub is_valid: bool,
    /// No line errors and at least one line.
    pub is_ready_for_checkout: bool,
}

impl CartReview {
    #[must_use]
    pub fn errors_for(&self, key: &LineKey) -> Option<LineErrors> {
        self.line_errors.get(key).copied()
    }
}

/// Check every line for a missing size or color.
#[must_use]
pub fn review_cart(cart: &Cart) -> CartReview {
    let line_errors: BTreeMap<_, _> = cart
        .lines()
        .iter()
        .filter_map(|line| {
            let errors = check_line(line);
            (!errors.is_empty()).then(|| (line.key(), errors))
        })
        .collect();

    let is_valid = line_errors.is_empty();
    let cart_is_empty = cart.is_empty();
    CartReview {
        line_errors,
        cart_is_empty,
        is_valid,
        is_ready_for_checkout: is_valid && !cart_is_empty,
    }
}

fn check_line(line: &CartLine) -> LineErrors {
    let product = line.product();
    LineErrors {
        missing_size: !sizes_of(product).is_empty() && line.selected_size().is_none(),
        missing_color: !colors_of(product).is_empty() && line.selected_color().is_none(),
    }
}
