//! Oba Core - view-model types and client-state logic.
//!
//! This crate holds everything the storefront knows about the marketplace
//! that does not involve I/O:
//! - [`types`] - Newtype wrappers for IDs, prices and emails
//! - [`product`] - Catalog view-models and listing queries
//! - [`cart`] - The visitor's cart and its totals
//! - [`game`] - Daily drawing challenge state and round timer
//! - [`checkout`] - Checkout form validation
//! - [`user`] - Account, profile and registration forms
//!
//! # Architecture
//!
//! No HTTP clients, no sessions, no templates. The storefront binary owns
//! those; this crate only shapes and mutates the data they carry, which keeps
//! the interesting rules unit-testable.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod game;
pub mod product;
pub mod types;
pub mod user;

pub use cart::{Cart, CartError, CartItem};
pub use checkout::{CheckoutError, CheckoutForm, PaymentMethod};
pub use game::{DailyChallenge, Drawing, DrawingError, GameRound, GameState};
pub use product::{Category, Pagination, Product, ProductPage, ProductQuery, SortOption};
pub use types::*;
pub use user::{Address, Preferences, ProfileUpdate, RegistrationForm, User};
