//! Cache types for catalog responses.

use oba_core::{Product, ProductId, ProductPage};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// A listing, keyed by its encoded API query.
    Products(String),
    Featured,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Box<ProductPage>),
    Featured(Vec<Product>),
    Product(Box<Product>),
}
