//! Cart commands.
//!
//! Every command goes through the session's cart store, so the cart file is
//! rewritten after each change.

use clap::Args;
use medina_core::pricing::{format_amount, line_total};
use medina_core::{Cart, CartReview, CartTotals, OptionUpdate, OptionsPatch, ProductId};
use medina_storefront::CartCommand;

use super::{CommandError, Session};

/// Arguments of `cart options`.
#[derive(Debug, Args)]
pub struct OptionsArgs {
    pub id: ProductId,
    /// New size
    #[arg(short, long, conflicts_with = "clear_size")]
    pub size: Option<String>,
    /// New color
    #[arg(short, long, conflicts_with = "clear_color")]
    pub color: Option<String>,
    /// Unset the size
    #[arg(long)]
    pub clear_size: bool,
    /// Unset the color
    #[arg(long)]
    pub clear_color: bool,
}

impl OptionsArgs {
    fn patch(&self) -> OptionsPatch {
        OptionsPatch {
            size: option_update(self.size.as_deref(), self.clear_size),
            color: option_update(self.color.as_deref(), self.clear_color),
        }
    }
}

fn option_update(value: Option<&str>, clear: bool) -> OptionUpdate {
    match (value, clear) {
        (_, true) => OptionUpdate::Clear,
        (Some(value), false) => OptionUpdate::set(value),
        (None, false) => OptionUpdate::Keep,
    }
}

/// Print the cart, its line problems, and its totals.
pub fn show(session: &mut Session, city: &str) {
    session.edit_form(|form| form.city = city.to_owned());
    print_cart(session.cart(), &session.review(), &session.totals());
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the product cannot be fetched.
pub async fn add(
    session: &mut Session,
    id: ProductId,
    size: Option<String>,
    color: Option<String>,
) -> Result<(), CommandError> {
    let product = session.product(id).await?;
    session.dispatch(&CartCommand::Add {
        product,
        size,
        color,
    });
    print_cart(session.cart(), &session.review(), &session.totals());
    Ok(())
}

pub fn update(
    session: &mut Session,
    id: ProductId,
    quantity: i64,
    size: Option<String>,
    color: Option<String>,
) {
    session.dispatch(&CartCommand::UpdateQuantity {
        id,
        quantity,
        size,
        color,
    });
    print_cart(session.cart(), &session.review(), &session.totals());
}

pub fn remove(session: &mut Session, id: ProductId, size: Option<String>, color: Option<String>) {
    session.dispatch(&CartCommand::Remove { id, size, color });
    print_cart(session.cart(), &session.review(), &session.totals());
}

pub fn options(session: &mut Session, args: &OptionsArgs) {
    session.dispatch(&CartCommand::UpdateOptions {
        id: args.id,
        patch: args.patch(),
    });
    print_cart(session.cart(), &session.review(), &session.totals());
}

pub fn clear(session: &mut Session) {
    session.dispatch(&CartCommand::Clear);
    print_cart(session.cart(), &session.review(), &session.totals());
}

/// Print the cart lines with any missing options.
#[allow(clippy::print_stdout)]
pub fn print_cart(cart: &Cart, review: &CartReview, totals: &CartTotals) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.lines() {
        let mut options = Vec::new();
        if let Some(size) = line.selected_size() {
            options.push(format!("Size: {size}"));
        }
        if let Some(color) = line.selected_color() {
            options.push(format!("Color: {color}"));
        }
        println!(
            "{:>6}  {} x{}  {}  {}",
            line.product_id(),
            line.product().title,
            line.quantity(),
            options.join(", "),
            format_amount(line_total(line))
        );
        if let Some(errors) = review.errors_for(&line.key()) {
            for message in errors.messages() {
                println!("        ! {message}");
            }
        }
    }

    let (subtotal, shipping, total) = totals.formatted();
    println!();
    println!("Items:    {}", totals.item_count);
    println!("Subtotal: {subtotal}");
    println!("Shipping: {shipping}");
    println!("Total:    {total}");
    if review.is_ready_for_checkout {
        println!("Ready for checkout.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_updates() {
        assert_eq!(option_update(None, false), OptionUpdate::Keep);
        assert_eq!(option_update(Some("M"), false), OptionUpdate::Set("M".into()));
        assert_eq!(option_update(Some("M"), true), OptionUpdate::Clear);
        assert_eq!(option_update(Some("  "), false), OptionUpdate::Clear);
    }
}
