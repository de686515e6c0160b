//! Medina Core - cart and checkout engine.
//!
//! This crate holds the rules of the storefront: how products expose their
//! selectable variants, how cart lines are identified and merged, how totals
//! are priced, when a checkout is ready, and how an order payload is built.
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage backends. The `medina-storefront` crate wraps it with
//! the catalog client, durable cart storage, and order submission.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, and emails
//! - [`catalog`] - Products, variant resolution, and catalog filters
//! - [`cart`] - Cart lines, identity keys, and cart operations
//! - [`pricing`] - Subtotal, shipping policies, totals, and formatting
//! - [`checkout`] - Form and cart validation, checkout flow state machine
//! - [`order`] - Order payload construction and response interpretation
//! - [`contact`] - Contact form validation and message construction

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod order;
pub mod pricing;
pub mod types;

pub use cart::{Cart, CartError, CartLine, LineKey, OptionUpdate, OptionsPatch};
pub use catalog::{Product, ProductFilter, ProductImage, ProductType, RawProduct};
pub use checkout::{
    CartReview, CheckoutError, CheckoutFlow, CheckoutForm, CheckoutState, FieldError, FormField,
    FormValidation, LineErrors, SubmissionTicket, review_cart, validate_form,
};
pub use contact::{ContactError, ContactField, ContactFieldError, ContactForm, ContactMessage};
pub use order::{OrderDraft, OrderLine, OrderPayload, SubmissionReply, UsdBreakdown};
pub use pricing::{CartTotals, ExchangeRate, PricingError, ShippingPolicy, ShippingRules};
pub use types::*;
