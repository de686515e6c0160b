//! Checkout readiness: the cart review pass, the form validation pass, and
//! the flow state machine that sits on top of both.
//!
//! The two passes are separate gates at different points of the flow and
//! return separate types. Validation problems are values, never `Err`.

mod flow;
mod form;
mod review;

use thiserror::Error;

pub use flow::{CheckoutFlow, CheckoutState, SubmissionTicket};
pub use form::{CheckoutForm, FieldError, FormField, FormValidation, validate_form};
pub use review::{COLOR_REQUIRED, CartReview, LineErrors, SIZE_REQUIRED, review_cart};

/// Errors from driving the checkout.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// The flow cannot move between these states.
    #[error("cannot move checkout from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    /// An order was prepared from a form that has errors.
    #[error("checkout form has {} invalid field(s)", .0.len())]
    InvalidForm(Vec<FieldError>),

    /// An order was prepared from an empty cart.
    #[error("cart is empty")]
    EmptyCart,
}
