//! Product listing commands.

use medina_core::catalog::{colors_of, default_image, requires_variant_selection, sizes_of};
use medina_core::pricing::format_amount;
use medina_core::{Product, ProductFilter, ProductId};

use super::{CommandError, Session};

/// List products passing `filter`.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub async fn list(session: &mut Session, filter: &str) -> Result<(), CommandError> {
    session.load_catalog().await?;
    let filter = ProductFilter::parse(filter);
    print_listing(&session.filtered(&filter));
    Ok(())
}

/// Show one product with its selectable options.
///
/// # Errors
///
/// Returns an error if the product cannot be fetched.
pub async fn show(session: &Session, id: ProductId) -> Result<(), CommandError> {
    let product = session.product(id).await?;
    let image = default_image(&product, None).and_then(|img| session.catalog().image_url(img));
    print_product(&product, image.as_ref().map(url::Url::as_str));
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_listing(products: &[&Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    for product in products {
        println!(
            "{:>6}  {:<8}  {:>12}  {}",
            product.id,
            product.product_type.as_str(),
            format_amount(product.price.amount()),
            product.title
        );
    }
}

#[allow(clippy::print_stdout)]
fn print_product(product: &Product, image: Option<&str>) {
    println!("{} (#{})", product.title, product.id);
    println!("  Price: {}", format_amount(product.price.amount()));
    println!("  Type:  {}", product.product_type.as_str());
    if !product.description.is_empty() {
        println!("  {}", product.description);
    }

    let sizes = sizes_of(product);
    if !sizes.is_empty() {
        println!("  Sizes:  {}", sizes.join(", "));
    }
    let colors = colors_of(product);
    if !colors.is_empty() {
        println!("  Colors: {}", colors.join(", "));
    }
    if requires_variant_selection(product) {
        println!("  Choose a size and color when adding this product.");
    }
    if let Some(url) = image {
        println!("  Image: {url}");
    }
}
