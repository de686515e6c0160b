//! Catalog data: products, their images, and variant resolution.
//!
//! Products are read-only snapshots fetched from the catalog API. Raw API
//! records ([`RawProduct`]) are normalized into [`Product`] exactly once,
//! so the price is always a decimal by the time it reaches the cart.

mod filter;
mod product;
pub mod variant;

pub use filter::ProductFilter;
pub use product::{Product, ProductImage, ProductType, RawProduct};
pub use variant::{
    colors_of, default_image, images_for_color, requires_variant_selection, sizes_of,
};
