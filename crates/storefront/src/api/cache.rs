//! Cache types for catalog responses.

use bookbarn_core::ProductId;

use crate::api::types::{Product, ProductPage, ProductSearch};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Search(ProductSearch),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Search(ProductPage),
}
