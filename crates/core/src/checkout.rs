//! Checkout form and its validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Email;

/// How the order will be paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Bank,
    Cash,
}

impl PaymentMethod {
    pub const ALL: [Self; 3] = [Self::Card, Self::Bank, Self::Cash];

    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Bank => "bank",
            Self::Cash => "cash",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Card => "Credit/Debit Card",
            Self::Bank => "Bank Transfer",
            Self::Cash => "Cash on Delivery",
        }
    }
}

/// A single invalid checkout field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Card number must be 13 to 19 digits")]
    InvalidCardNumber,
    #[error("Expiry date must be in MM/YY format")]
    InvalidExpiry,
    #[error("CVV must be 3 or 4 digits")]
    InvalidCvv,
}

/// Checkout form as posted by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub payment_method: PaymentMethod,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl CheckoutForm {
    /// Validate every field, collecting all problems.
    ///
    /// Card fields are only checked when paying by card.
    ///
    /// # Errors
    ///
    /// Returns every [`CheckoutError`] found, in form order.
    pub fn validate(&self) -> Result<(), Vec<CheckoutError>> {
        let mut errors = Vec::new();

        let required = [
            ("First name", &self.first_name),
            ("Last name", &self.last_name),
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("Address", &self.address),
            ("City", &self.city),
            ("ZIP code", &self.zip_code),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                errors.push(CheckoutError::Required(label));
            }
        }

        if !self.email.trim().is_empty() && Email::parse(&self.email).is_err() {
            errors.push(CheckoutError::InvalidEmail);
        }

        if self.payment_method == PaymentMethod::Card {
            let digits: String = self
                .card_number
                .chars()
                .filter(|c| !matches!(c, ' ' | '-'))
                .collect();
            if !(13..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
                errors.push(CheckoutError::InvalidCardNumber);
            }
            if !is_valid_expiry(self.expiry_date.trim()) {
                errors.push(CheckoutError::InvalidExpiry);
            }
            let cvv = self.cvv.trim();
            if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
                errors.push(CheckoutError::InvalidCvv);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Last four digits of the card, for logs and confirmations.
    #[must_use]
    pub fn card_last_four(&self) -> Option<String> {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        (self.payment_method == PaymentMethod::Card && digits.len() >= 4)
            .then(|| digits.iter().skip(digits.len() - 4).collect())
    }
}

fn is_valid_expiry(value: &str) -> bool {
    let Some((month, year)) = value.split_once('/') else {
        return false;
    };
    month.len() == 2
        && year.len() == 2
        && year.chars().all(|c| c.is_ascii_digit())
        && month
            .parse::<u8>()
            .is_ok_and(|month| (1..=12).contains(&month))
}
