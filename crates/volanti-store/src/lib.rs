//! Volanti Store: SQLite product catalog behind the `CatalogStore` boundary.

pub mod catalog;
pub mod embedding;
pub mod schema;
pub mod seed;
pub mod sqlite;
pub mod types;

pub use catalog::CatalogStore;
pub use sqlite::SqliteCatalog;
pub use types::*;
