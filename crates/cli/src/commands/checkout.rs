//! Checkout command.

use clap::Args;
use medina_core::{CheckoutError, CheckoutForm};
use medina_storefront::StorefrontError;

use super::cart::print_cart;
use super::{CommandError, Session};

/// Contact and shipping details for the order.
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub zip_code: String,
}

impl CheckoutArgs {
    fn fill(self, form: &mut CheckoutForm) {
        form.first_name = self.first_name;
        form.last_name = self.last_name;
        form.email = self.email;
        form.phone = self.phone;
        form.address = self.address;
        form.city = self.city;
        form.zip_code = self.zip_code;
    }
}

/// Review the cart, fill the form, and submit the order.
///
/// # Errors
///
/// Returns an error if the cart needs options, the form is invalid, or the
/// order is not accepted. The cart is kept in every case.
pub async fn run(session: &mut Session, args: CheckoutArgs) -> Result<(), CommandError> {
    let review = session.review();
    if !review.is_ready_for_checkout {
        print_cart(session.cart(), &review, &session.totals());
        if review.cart_is_empty {
            return Err(StorefrontError::Checkout(CheckoutError::EmptyCart).into());
        }
        return Err(CommandError::CartNotReady(review.line_errors.len()));
    }

    session.open_checkout()?;
    session.edit_form(|form| args.fill(form));

    print_cart(session.cart(), &review, &session.totals());
    let receipt = session.submit_order().await?;
    print_receipt(receipt.message.as_deref());
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_receipt(message: Option<&str>) {
    println!();
    println!("Order placed.");
    if let Some(message) = message {
        println!("{message}");
    }
}
