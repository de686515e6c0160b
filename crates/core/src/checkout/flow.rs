//! Checkout flow state machine.
//!
//! ```text
//! Browsing -> ReadyForCheckoutForm -> FormEditing -> ReadyToSubmit -> Submitting
//!                                         ^                              |
//!                                         +------ Failed <---------------+--> Success
//! ```
//!
//! An empty cart sends the flow back to `Browsing` from any state.

use std::fmt;

use serde::Serialize;

use super::form::FormValidation;
use super::review::CartReview;
use super::CheckoutError;

/// Where the shopper is in the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutState {
    /// Shopping; the cart is empty or has lines missing selections.
    #[default]
    Browsing,
    /// The cart passed review; the checkout form can be opened.
    ReadyForCheckoutForm,
    /// The form is open and has errors.
    FormEditing,
    /// The form is valid; submission may start.
    ReadyToSubmit,
    /// An order submission is in flight.
    Submitting,
    /// The order was accepted.
    Success,
    /// The last submission failed; the form is kept for a retry.
    Failed { reason: String },
}

impl CheckoutState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Browsing => "browsing",
            Self::ReadyForCheckoutForm => "ready_for_checkout_form",
            Self::FormEditing => "form_editing",
            Self::ReadyToSubmit => "ready_to_submit",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle for one submission attempt.
///
/// Only the ticket of the latest attempt can complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the ticket is needed to complete the submission"]
pub struct SubmissionTicket(u64);

/// Checkout flow driven by cart reviews, form validations, and submission
/// outcomes.
#[derive(Debug, Clone, Default)]
pub struct CheckoutFlow {
    state: CheckoutState,
    attempt: u64,
}

impl CheckoutFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Apply a fresh cart review. Call after every cart change.
    pub fn sync_cart(&mut self, review: &CartReview) -> &CheckoutState {
        if review.cart_is_empty {
            if self.state == CheckoutState::Submitting {
                // Orphan the in-flight attempt.
                self.attempt += 1;
            }
            self.state = CheckoutState::Browsing;
            return &self.state;
        }

        match self.state {
            CheckoutState::Browsing if review.is_ready_for_checkout => {
                self.state = CheckoutState::ReadyForCheckoutForm;
            }
            CheckoutState::ReadyForCheckoutForm if !review.is_ready_for_checkout => {
                self.state = CheckoutState::Browsing;
            }
            _ => {}
        }
        &self.state
    }

    /// Navigate to the checkout form.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] unless the cart passed
    /// review, a previous attempt ended, or the form is already open.
    pub fn open_form(&mut self) -> Result<&CheckoutState, CheckoutError> {
        match self.state {
            CheckoutState::ReadyForCheckoutForm
            | CheckoutState::Success
            | CheckoutState::Failed { .. } => self.state = CheckoutState::FormEditing,
            CheckoutState::FormEditing | CheckoutState::ReadyToSubmit => {}
            CheckoutState::Browsing | CheckoutState::Submitting => {
                return Err(self.invalid("form_editing"));
            }
        }
        Ok(&self.state)
    }

    /// Apply a fresh form validation. Call after every form or cart change
    /// while the form is open.
    pub fn sync_form(&mut self, validation: &FormValidation) -> &CheckoutState {
        match self.state {
            CheckoutState::FormEditing | CheckoutState::Failed { .. } if validation.is_valid => {
                self.state = CheckoutState::ReadyToSubmit;
            }
            CheckoutState::ReadyToSubmit | CheckoutState::Failed { .. } if !validation.is_valid => {
                self.state = CheckoutState::FormEditing;
            }
            _ => {}
        }
        &self.state
    }

    /// Start a submission.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] unless the form is ready
    /// to submit.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, CheckoutError> {
        if self.state != CheckoutState::ReadyToSubmit {
            return Err(self.invalid("submitting"));
        }
        self.attempt += 1;
        self.state = CheckoutState::Submitting;
        Ok(SubmissionTicket(self.attempt))
    }

    /// Record the outcome of a submission.
    ///
    /// Returns `false` and changes nothing when the ticket is stale, i.e. the
    /// flow moved on while the request was in flight.
    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<(), String>,
    ) -> bool {
        if self.state != CheckoutState::Submitting || ticket.0 != self.attempt {
            return false;
        }
        self.state = match outcome {
            Ok(()) => CheckoutState::Success,
            Err(reason) => CheckoutState::Failed { reason },
        };
        true
    }

    /// Whether the ticket still belongs to the in-flight submission.
    #[must_use]
    pub fn is_current(&self, ticket: SubmissionTicket) -> bool {
        self.state == CheckoutState::Submitting && ticket.0 == self.attempt
    }

    fn invalid(&self, to: &'static str) -> CheckoutError {
        CheckoutError::InvalidTransition {
            from: self.state.as_str(),
            to,
        }
    }
}
