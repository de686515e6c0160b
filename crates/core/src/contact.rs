//! Contact messages sent from the storefront's contact form.
//!
//! A [`ContactMessage`] is only built from a form whose required fields are
//! filled and whose email has the same shape checkout asks for. It goes to
//! the same intake endpoint as orders.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Email, EmailError};

/// Phone value sent when the shopper leaves the field blank.
pub const PHONE_NOT_PROVIDED: &str = "Not provided";

/// What the shopper typed into the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactForm {
    #[must_use]
    pub fn value(&self, field: ContactField) -> &str {
        match field {
            ContactField::FirstName => &self.first_name,
            ContactField::LastName => &self.last_name,
            ContactField::Email => &self.email,
            ContactField::Message => &self.message,
        }
    }

    /// Reset every field, as after a message went through.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A required contact form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    Message,
}

impl ContactField {
    pub const REQUIRED: [Self; 4] = [Self::FirstName, Self::LastName, Self::Email, Self::Message];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::Email => "Email",
            Self::Message => "Message",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a contact field was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactFieldError {
    #[error("{0} is required")]
    Required(ContactField),
    #[error("Email address is invalid")]
    InvalidEmail,
}

/// Errors from preparing a contact message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("contact form has {} invalid field(s)", .0.len())]
    InvalidForm(Vec<ContactFieldError>),
}

/// Check the required fields and the email shape.
#[must_use]
pub fn validate_contact(form: &ContactForm) -> BTreeMap<ContactField, ContactFieldError> {
    ContactField::REQUIRED
        .into_iter()
        .filter_map(|field| check_field(form, field).map(|error| (field, error)))
        .collect()
}

fn check_field(form: &ContactForm, field: ContactField) -> Option<ContactFieldError> {
    let value = form.value(field);
    if field == ContactField::Email {
        return match Email::parse(value) {
            Ok(_) => None,
            Err(EmailError::Empty) => Some(ContactFieldError::Required(field)),
            Err(EmailError::Malformed) => Some(ContactFieldError::InvalidEmail),
        };
    }
    value
        .trim()
        .is_empty()
        .then_some(ContactFieldError::Required(field))
}

/// The JSON body posted for a contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    #[serde(rename = "_subject")]
    pub subject: String,
}

impl ContactMessage {
    /// Validate the form and build the message.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::InvalidForm`] listing every refused field.
    pub fn prepare(form: &ContactForm, subject: &str) -> Result<Self, ContactError> {
        let errors = validate_contact(form);
        if !errors.is_empty() {
            return Err(ContactError::InvalidForm(errors.into_values().collect()));
        }

        let phone = form.phone.trim();
        Ok(Self {
            name: format!("{} {}", form.first_name.trim(), form.last_name.trim()),
            email: form.email.trim().to_owned(),
            phone: if phone.is_empty() {
                PHONE_NOT_PROVIDED.to_owned()
            } else {
                phone.to_owned()
            },
            message: form.message.trim().to_owned(),
            subject: subject.to_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn filled() -> ContactForm {
        ContactForm {
            first_name: " Youssef".into(),
            last_name: "Benali ".into(),
            email: "youssef@example.ma".into(),
            phone: String::new(),
            message: "Do you ship to Tangier?".into(),
        }
    }

    #[test]
    fn test_message_body() {
        let message = ContactMessage::prepare(&filled(), "New Contact Form Submission").unwrap();
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "name": "Youssef Benali",
                "email": "youssef@example.ma",
                "phone": "Not provided",
                "message": "Do you ship to Tangier?",
                "_subject": "New Contact Form Submission"
            })
        );
    }

    #[test]
    fn test_phone_kept_when_given() {
        let form = ContactForm {
            phone: " 0611223344 ".into(),
            ..filled()
        };
        let message = ContactMessage::prepare(&form, "Contact").unwrap();
        assert_eq!(message.phone, "0611223344");
    }

    #[test]
    fn test_required_fields() {
        let errors = validate_contact(&ContactForm::default());
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors.get(&ContactField::Message).unwrap().to_string(),
            "Message is required"
        );

        let err = ContactMessage::prepare(&ContactForm::default(), "Contact").unwrap_err();
        assert!(matches!(err, ContactError::InvalidForm(fields) if fields.len() == 4));
    }

    #[test]
    fn test_email_uses_checkout_rule() {
        let bad = ContactForm {
            email: "youssef@localhost".into(),
            ..filled()
        };
        assert_eq!(
            validate_contact(&bad).get(&ContactField::Email),
            Some(&ContactFieldError::InvalidEmail)
        );

        let long = ContactForm {
            email: format!("{}@example.com", "y".repeat(250)),
            ..filled()
        };
        assert!(validate_contact(&long).is_empty());
    }

    #[test]
    fn test_clear_resets_form() {
        let mut form = filled();
        form.clear();
        assert_eq!(form, ContactForm::default());
    }
}
