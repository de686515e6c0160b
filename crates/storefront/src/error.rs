//! Unified error handling with Sentry integration.
//!
//! [`StorefrontError`] wraps every failure a storefront session can surface.
//! Views show [`StorefrontError::user_message`] and call
//! [`StorefrontError::report`], which forwards infrastructure failures to
//! Sentry before they are swallowed.

use medina_core::{CartError, CheckoutError, ContactError};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::orders::SubmitError;
use crate::storage::StorageError;

/// Session-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),

    /// A contact message failed on its way to the intake endpoint.
    #[error("Contact message not sent: {0}")]
    ContactNotSent(#[source] SubmitError),

    /// The view that started the work went away first.
    #[error("Cancelled")]
    Cancelled,
}

impl StorefrontError {
    /// Whether this error points at a fault worth tracking, as opposed to
    /// something the shopper caused or can fix.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        match self {
            Self::Config(_) | Self::Storage(_) | Self::Cart(_) => true,
            Self::Catalog(err) => !matches!(err, CatalogError::NotFound(_)),
            Self::Submit(err) | Self::ContactNotSent(err) => {
                !matches!(err, SubmitError::Rejected(_))
            }
            Self::Checkout(_) | Self::Contact(_) | Self::Cancelled => false,
        }
    }

    /// Message safe to show a shopper.
    ///
    /// Transport details, URLs and status codes are never included.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::NotFound(_)) => "Product not found".to_string(),
            Self::Catalog(_) => "Products could not be loaded, please try again".to_string(),
            Self::Submit(SubmitError::Rejected(Some(reason))) => reason.clone(),
            Self::Submit(SubmitError::Rejected(None)) => "Your order was not accepted".to_string(),
            Self::Submit(_) => {
                "Your order could not be sent, please try again".to_string()
            }
            Self::Checkout(CheckoutError::EmptyCart) => "Your cart is empty".to_string(),
            Self::Checkout(CheckoutError::InvalidForm(errors)) => errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Checkout(CheckoutError::InvalidTransition { .. }) => {
                "Checkout is not available right now".to_string()
            }
            Self::Contact(ContactError::InvalidForm(errors)) => errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            Self::ContactNotSent(_) => "Something went wrong. Please try again later.".to_string(),
            Self::Storage(_) | Self::Cart(_) => "Your cart could not be saved".to_string(),
            Self::Config(_) => "The store is not configured correctly".to_string(),
            Self::Cancelled => "Cancelled".to_string(),
        }
    }

    /// Capture server faults to Sentry and log them.
    ///
    /// Shopper-side errors are only logged at debug level.
    pub fn report(&self) {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Storefront error");
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "add", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
