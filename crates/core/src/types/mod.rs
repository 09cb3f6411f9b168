//! Core types for the Oba storefront.
//!
//! Type-safe wrappers for identifiers, money and email addresses.

pub mod email;
pub mod id;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
