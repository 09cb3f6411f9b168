//! Session-backed state services for the storefront.
//!
//! # Services
//!
//! - `cart` - The visitor's cart, persisted under the `cart` session key
//! - `game` - Drawing round timer and last known game state

pub mod cart;
pub mod game;
