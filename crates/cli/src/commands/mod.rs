//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;

use medina_storefront::{FileCartStorage, StorefrontConfig, StorefrontError, StorefrontSession};
use thiserror::Error;

/// Session type every command runs against.
pub type Session = StorefrontSession<FileCartStorage>;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{}", .0.user_message())]
    Storefront(#[from] StorefrontError),

    /// The cart has lines that still need a size or color.
    #[error("Cart is not ready for checkout ({0} line(s) need options)")]
    CartNotReady(usize),
}

/// Open a session on the configured cart directory.
///
/// # Errors
///
/// Returns an error if the HTTP clients cannot be built.
pub fn open_session(config: &StorefrontConfig) -> Result<Session, CommandError> {
    tracing::debug!(dir = %config.cart_storage_dir.display(), "Opening cart");
    Ok(StorefrontSession::from_config(config)?)
}
