//! Account types and the forms that edit them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Email, UserId};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Postal address on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip_code: String,
}

/// Notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: false,
            sms: false,
        }
    }
}

/// Privacy toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacyPreferences {
    pub ai_recommendations: bool,
    pub share_game_stats: bool,
}

impl Default for PrivacyPreferences {
    fn default() -> Self {
        Self {
            ai_recommendations: true,
            share_game_stats: true,
        }
    }
}

/// Account settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub notifications: NotificationPreferences,
    pub privacy: PrivacyPreferences,
}

/// The signed-in account, as returned by `/auth/*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub preferences: Preferences,
}

impl User {
    /// First word of the name, for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// Invalid account form input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Body of `PUT /auth/profile` from the profile tab.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address: Address,
}

impl ProfileUpdate {
    /// Trim fields and turn a blank phone into `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        let phone = self
            .phone
            .map(|phone| phone.trim().to_string())
            .filter(|phone| !phone.is_empty());
        Self {
            name: self.name.trim().to_string(),
            phone,
            address: Address {
                street: self.address.street.trim().to_string(),
                city: self.address.city.trim().to_string(),
                zip_code: self.address.zip_code.trim().to_string(),
            },
        }
    }

    /// # Errors
    ///
    /// Returns [`FormError::Required`] when the name is blank.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::Required("Full name"));
        }
        Ok(())
    }

    /// Apply the update to a cached user so the page reflects it immediately.
    pub fn apply_to(&self, user: &mut User) {
        user.name.clone_from(&self.name);
        user.phone.clone_from(&self.phone);
        user.address = self.address.clone();
    }
}

/// Registration form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub phone: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: Email,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl RegistrationForm {
    /// Validate and turn the form into a backend request.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] found.
    pub fn into_request(self) -> Result<RegistrationRequest, FormError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(FormError::Required("Name"));
        }
        if self.email.trim().is_empty() {
            return Err(FormError::Required("Email"));
        }
        let email = Email::parse(&self.email).map_err(|_| FormError::InvalidEmail)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(FormError::PasswordTooShort);
        }
        if self.password != self.password_confirm {
            return Err(FormError::PasswordMismatch);
        }
        let phone = Some(self.phone.trim().to_string()).filter(|phone| !phone.is_empty());

        Ok(RegistrationRequest {
            name,
            email,
            password: self.password,
            phone,
        })
    }
}
