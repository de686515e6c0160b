//! Checkout form and its field validation pass.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::{Email, EmailError};

/// Contact and shipping details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
}

impl CheckoutForm {
    /// Raw value of a field.
    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::Address => &self.address,
            FormField::City => &self.city,
            FormField::ZipCode => &self.zip_code,
        }
    }

    /// Mutable access to a field, for form editors.
    pub fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::Address => &mut self.address,
            FormField::City => &mut self.city,
            FormField::ZipCode => &mut self.zip_code,
        }
    }
}

/// A checkout form field, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    ZipCode,
}

impl FormField {
    pub const ALL: [Self; 7] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::City,
        Self::ZipCode,
    ];

    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
            Self::ZipCode => "zipCode",
        }
    }

    /// Label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::Email => "Email",
            Self::Phone => "Phone number",
            Self::Address => "Address",
            Self::City => "City",
            Self::ZipCode => "Zip Code",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{} is required", .0.label())]
    Required(FormField),
    #[error("Email address is invalid")]
    InvalidEmail,
}

/// Result of the checkout-form pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormValidation {
    pub field_errors: BTreeMap<FormField, FieldError>,
    /// The cart was empty when the form was checked.
    pub cart_is_empty: bool,
    /// No field errors and a non-empty cart.
    pub is_valid: bool,
}

impl FormValidation {
    #[must_use]
    pub fn error_for(&self, field: FormField) -> Option<FieldError> {
        self.field_errors.get(&field).copied()
    }
}

/// Validate every form field and the cart-level rule.
#[must_use]
pub fn validate_form(form: &CheckoutForm, cart: &Cart) -> FormValidation {
    let field_errors: BTreeMap<_, _> = FormField::ALL
        .into_iter()
        .filter_map(|field| check_field(form, field).map(|error| (field, error)))
        .collect();

    let cart_is_empty = cart.is_empty();
    FormValidation {
        is_valid: field_errors.is_empty() && !cart_is_empty,
        field_errors,
        cart_is_empty,
    }
}

fn check_field(form: &CheckoutForm, field: FormField) -> Option<FieldError> {
    let value = form.value(field);
    if field == FormField::Email {
        return match Email::parse(value) {
            Ok(_) => None,
            Err(EmailError::Empty) => Some(FieldError::Required(field)),
            Err(_) => Some(FieldError::InvalidEmail),
        };
    }
    value.trim().is_empty().then_some(FieldError::Required(field))
}
