//! Marketplace REST API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth: products, scoring, accounts, orders
//! - Plain JSON over HTTP with `reqwest`; bearer token for signed-in calls
//! - Catalog reads are cached in memory via `moka`; per-user calls never are
//!
//! # Example
//!
//! ```rust,ignore
//! use oba_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config.api)?;
//! let page = api.list_products(&ProductQuery::default()).await?;
//! let product = api.get_product(&page.products[0].id).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::ApiClient;

use thiserror::Error;

/// Errors that can occur when calling the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or expired token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl ApiError {
    /// Message suitable for a toast.
    ///
    /// Backend-provided messages (invalid credentials, validation errors) are
    /// passed through; transport details are not.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Status { status, message } if (400..500).contains(status) => {
                Some(message.as_str()).filter(|m| !m.is_empty())
            }
            Self::Unauthorized(message) => Some(message.as_str()).filter(|m| !m.is_empty()),
            _ => None,
        }
    }

    /// Whether the session token was rejected.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
