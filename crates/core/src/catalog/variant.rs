//! Variant resolution: which colors and sizes a product offers.
//!
//! Every "does this product need a size/color choice" decision in the
//! crate goes through [`requires_variant_selection`].

use super::{Product, ProductImage, ProductType};

/// Distinct non-blank image colors, trimmed, in first-seen order.
#[must_use]
pub fn colors_of(product: &Product) -> Vec<&str> {
    let mut colors: Vec<&str> = Vec::new();
    for color in product
        .images
        .iter()
        .filter_map(|image| image.color.as_deref())
        .map(str::trim)
    {
        if color.is_empty() || colors.contains(&color) {
            continue;
        }
        colors.push(color);
    }
    colors
}

/// Selectable sizes. Only t-shirts have sizes.
///
/// Tokens are trimmed and empty tokens dropped; duplicates are kept as the
/// catalog sent them.
#[must_use]
pub fn sizes_of(product: &Product) -> Vec<&str> {
    if product.product_type != ProductType::Tshirt {
        return Vec::new();
    }
    product
        .available_sizes
        .as_deref()
        .map(|sizes| {
            sizes
                .split(',')
                .map(str::trim)
                .filter(|size| !size.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Whether adding this product to the cart needs a size or color choice.
#[must_use]
pub fn requires_variant_selection(product: &Product) -> bool {
    !colors_of(product).is_empty() || !sizes_of(product).is_empty()
}

/// Images for a color, falling back to every image.
///
/// Colors compare trimmed. With no color, or a color no image shows, the
/// full list is returned.
#[must_use]
pub fn images_for_color<'a>(product: &'a Product, color: Option<&str>) -> Vec<&'a ProductImage> {
    let matching: Vec<&ProductImage> = match color.map(str::trim) {
        Some(wanted) => product
            .images
            .iter()
            .filter(|image| image.color.as_deref().map(str::trim) == Some(wanted))
            .collect(),
        None => Vec::new(),
    };

    if matching.is_empty() {
        product.images.iter().collect()
    } else {
        matching
    }
}

/// The image to show first for a color selection.
#[must_use]
pub fn default_image<'a>(product: &'a Product, color: Option<&str>) -> Option<&'a ProductImage> {
    images_for_color(product, color).into_iter().next()
}
