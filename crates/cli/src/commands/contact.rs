//! Contact command.

use clap::Args;
use medina_core::ContactForm;

use super::{CommandError, Session};

/// A message for the shop.
#[derive(Debug, Args)]
pub struct ContactArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    /// Optional phone number
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long)]
    pub message: String,
}

impl From<ContactArgs> for ContactForm {
    fn from(args: ContactArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            message: args.message,
        }
    }
}

/// Send a contact message.
///
/// # Errors
///
/// Returns an error if a required field is missing or the message is not
/// delivered.
pub async fn run(session: &Session, args: ContactArgs) -> Result<(), CommandError> {
    let mut form = ContactForm::from(args);
    session.send_contact(&mut form).await?;
    print_sent();
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_sent() {
    println!("Thank you! Your message has been sent successfully.");
}
