//! Data types for products, orders, and catalog statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product as returned to callers: no embedding attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// A full product row, including the optional precomputed embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Present only after the batch embedding job has processed the row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Product {
    /// Returns the embedding if it is present and non-empty.
    pub fn usable_embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref().filter(|e| !e.is_empty())
    }

    /// Drop the embedding, keeping the caller-facing fields.
    pub fn into_summary(self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
        }
    }
}

/// Fields for inserting a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
        }
    }
}

/// Fields for inserting an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub status: String,
    pub estimated_delivery: Option<DateTime<Utc>>,
    /// Product ids in order-line order.
    pub product_ids: Vec<i64>,
    pub total_paid: f64,
    pub created_at: DateTime<Utc>,
}

/// A product line inside an order, without id, price, or embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedProduct {
    pub name: String,
    pub description: String,
}

/// An order with its resolved products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetails {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub total_paid: f64,
    pub created_at: DateTime<Utc>,
    pub products: Vec<OrderedProduct>,
}

/// Catalog-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_products: i64,
    pub embedded_products: i64,
    pub total_orders: i64,
    pub db_path: String,
}
