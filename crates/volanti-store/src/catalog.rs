//! The catalog boundary consumed by the product search engine.

use volanti_core::Result;

use crate::types::{Product, ProductSummary};

/// Read-only product queries used by search.
///
/// Every operation fails with `Error::StoreUnavailable` on a connectivity or
/// query error. "Storage order" is the order products were inserted in.
pub trait CatalogStore: Send + Sync {
    /// The first `limit` products in storage order, without embeddings.
    fn fetch_top_products(&self, limit: usize) -> Result<Vec<ProductSummary>>;

    /// Every product with its embedding, if one has been computed.
    fn fetch_all_with_embeddings(&self) -> Result<Vec<Product>>;

    /// Up to `limit` products whose name contains `text`, ignoring case,
    /// in storage order.
    fn search_by_name_substring(&self, text: &str, limit: usize) -> Result<Vec<ProductSummary>>;
}
