//! Product list filtering.

use super::{Product, ProductType};

/// Filter applied to the product listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductFilter {
    /// Every product.
    #[default]
    All,
    /// Only products of one type.
    Type(ProductType),
    /// Case-insensitive substring match on title or description.
    Text(String),
}

impl ProductFilter {
    /// Parse the filter keyword used by the product pages.
    ///
    /// `all`, `shirts` and `totebags` are keywords; anything else is a
    /// text search.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "" | "all" => Self::All,
            "shirts" => Self::Type(ProductType::Tshirt),
            "totebags" => Self::Type(ProductType::Totebag),
            _ => Self::Text(trimmed.to_lowercase()),
        }
    }

    /// Whether a product passes the filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Type(product_type) => product.product_type == *product_type,
            Self::Text(needle) => {
                let needle = needle.to_lowercase();
                product.title.to_lowercase().contains(&needle)
                    || product.description.to_lowercase().contains(&needle)
            }
        }
    }

    /// Keep the products that pass the filter, in order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Price, ProductId};

    fn catalog() -> Vec<Product> {
        vec![
            Product::new(ProductId::new(1), "Atlas Tee", Price::ZERO, ProductType::Tshirt),
            Product::new(ProductId::new(2), "Souk Tote", Price::ZERO, ProductType::Totebag)
                .with_description("Woven in Fes"),
        ]
    }

    #[test]
    fn test_keyword_filters() {
        let products = catalog();
        assert_eq!(ProductFilter::parse("all").apply(&products).len(), 2);
        assert_eq!(ProductFilter::parse("").apply(&products).len(), 2);

        let shirts = ProductFilter::parse("shirts").apply(&products);
        assert_eq!(shirts.len(), 1);
        assert_eq!(shirts[0].title, "Atlas Tee");

        let totes = ProductFilter::parse("Totebags").apply(&products);
        assert_eq!(totes[0].title, "Souk Tote");
    }

    #[test]
    fn test_text_filter_checks_title_and_description() {
        let products = catalog();
        assert_eq!(ProductFilter::parse("ATLAS").apply(&products).len(), 1);
        assert_eq!(ProductFilter::parse("fes").apply(&products).len(), 1);
        assert!(ProductFilter::parse("hoodie").apply(&products).is_empty());
    }
}
