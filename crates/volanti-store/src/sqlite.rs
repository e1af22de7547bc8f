//! SQLite-backed product catalog.
//!
//! One connection guarded by a mutex. Storage order is ascending product id,
//! which is insertion order given `AUTOINCREMENT`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use crate::catalog::CatalogStore;
use crate::embedding::{decode_embedding, encode_embedding};
use crate::schema::SCHEMA_SQL;
use crate::types::*;
use volanti_core::{Error, Result};

/// SQLite product catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

fn unavailable(e: rusqlite::Error) -> Error {
    Error::StoreUnavailable(e.to_string())
}

fn database(e: rusqlite::Error) -> Error {
    Error::Database(e.to_string())
}

impl SqliteCatalog {
    /// Open or create the catalog at `db_path`, creating parent directories.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::StoreUnavailable(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path).map_err(unavailable)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(database)?;

        let store = Self::with_connection(conn, db_path)?;
        let stats = store.stats()?;
        info!(
            "SqliteCatalog initialized: {} products ({} embedded), {} orders, path={}",
            stats.total_products,
            stats.embedded_products,
            stats.total_orders,
            store.db_path.display()
        );
        Ok(store)
    }

    /// Open a private in-memory catalog.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;").map_err(database)?;
        Self::with_connection(conn, PathBuf::from(":memory:"))
    }

    fn with_connection(conn: Connection, db_path: PathBuf) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Path of the database file (`:memory:` for in-memory catalogs).
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ---------------------------------------------------------------
    // Product writes
    // ---------------------------------------------------------------

    /// Insert a product without an embedding. Returns the new product ID.
    pub fn add_product(&self, product: &NewProduct) -> Result<i64> {
        let now = Utc::now().timestamp_millis();
        let conn = self.conn.lock();
        let id = conn
            .prepare_cached(
                "INSERT INTO products (name, description, price, created_at) VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(database)?
            .insert(params![product.name, product.description, product.price, now])
            .map_err(database)?;
        Ok(id)
    }

    /// Store (or replace) the embedding for a product. Returns false if the
    /// product does not exist.
    pub fn set_product_embedding(&self, product_id: i64, embedding: &[f32]) -> Result<bool> {
        let blob = encode_embedding(embedding);
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "UPDATE products SET embedding = ?1 WHERE id = ?2",
                params![blob, product_id],
            )
            .map_err(database)?;
        Ok(count > 0)
    }

    /// Products that still lack an embedding, in storage order.
    pub fn products_without_embedding(&self, limit: usize) -> Result<Vec<ProductSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT id, name, description, price FROM products \
                 WHERE embedding IS NULL OR length(embedding) = 0 \
                 ORDER BY id LIMIT ?1",
            )
            .map_err(database)?;
        let rows = stmt
            .query_map(params![limit as i64], Self::row_to_summary)
            .map_err(database)?;
        let products = rows.collect::<rusqlite::Result<Vec<_>>>().map_err(database)?;
        Ok(products)
    }

    /// Delete every order and product.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "DELETE FROM order_items;
             DELETE FROM orders;
             DELETE FROM products;",
        )
        .map_err(database)?;
        info!("Catalog cleared");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Orders
    // ---------------------------------------------------------------

    /// Insert an order and its lines. Returns the generated order ID.
    pub fn add_order(&self, order: &NewOrder) -> Result<String> {
        let order_id = uuid::Uuid::new_v4().to_string();
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(database)?;
        tx.execute(
            "INSERT INTO orders (id, status, estimated_delivery, total_paid, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                order_id,
                order.status,
                order.estimated_delivery.map(|d| d.to_rfc3339()),
                order.total_paid,
                order.created_at.to_rfc3339(),
            ],
        )
        .map_err(database)?;
        for (position, product_id) in order.product_ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO order_items (order_id, product_id, position) VALUES (?1, ?2, ?3)",
                params![order_id, product_id, position as i64],
            )
            .map_err(database)?;
        }
        tx.commit().map_err(database)?;
        Ok(order_id)
    }

    /// Look up an order with its products. Lines pointing at products that
    /// no longer exist are skipped.
    pub fn get_order(&self, order_id: &str) -> Result<Option<OrderDetails>> {
        let conn = self.conn.lock();
        let header = conn
            .prepare_cached(
                "SELECT status, estimated_delivery, total_paid, created_at FROM orders WHERE id = ?1",
            )
            .map_err(unavailable)?
            .query_row(params![order_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .optional()
            .map_err(unavailable)?;

        let Some((status, estimated_delivery, total_paid, created_at)) = header else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare_cached(
                "SELECT oi.product_id, p.name, p.description FROM order_items oi \
                 LEFT JOIN products p ON p.id = oi.product_id \
                 WHERE oi.order_id = ?1 ORDER BY oi.position",
            )
            .map_err(unavailable)?;
        let rows = stmt
            .query_map(params![order_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })
            .map_err(unavailable)?;

        let mut products = Vec::new();
        for row in rows {
            match row.map_err(unavailable)? {
                (_, Some(name), description) => products.push(OrderedProduct {
                    name,
                    description: description.unwrap_or_default(),
                }),
                (product_id, None, _) => warn!("Product not found: {}", product_id),
            }
        }

        Ok(Some(OrderDetails {
            id: order_id.to_string(),
            status,
            estimated_delivery: estimated_delivery.as_deref().map(parse_timestamp).transpose()?,
            total_paid,
            created_at: parse_timestamp(&created_at)?,
            products,
        }))
    }

    // ---------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------

    /// Get catalog statistics.
    pub fn stats(&self) -> Result<CatalogStats> {
        let conn = self.conn.lock();
        let count = |sql: &str| -> Result<i64> {
            conn.query_row(sql, [], |row| row.get(0)).map_err(unavailable)
        };
        let stats = CatalogStats {
            total_products: count("SELECT COUNT(*) FROM products")?,
            embedded_products: count(
                "SELECT COUNT(*) FROM products WHERE embedding IS NOT NULL AND length(embedding) > 0",
            )?,
            total_orders: count("SELECT COUNT(*) FROM orders")?,
            db_path: self.db_path.to_string_lossy().to_string(),
        };
        Ok(stats)
    }

    // ---------------------------------------------------------------
    // Row Mapping Helpers
    // ---------------------------------------------------------------

    fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProductSummary> {
        Ok(ProductSummary {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            price: row.get("price")?,
        })
    }

    fn row_to_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
        let blob: Option<Vec<u8>> = row.get("embedding")?;
        Ok(Product {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            price: row.get("price")?,
            embedding: blob.as_deref().and_then(decode_embedding),
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Invalid timestamp '{}': {}", raw, e)))
}

impl CatalogStore for SqliteCatalog {
    fn fetch_top_products(&self, limit: usize) -> Result<Vec<ProductSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT id, name, description, price FROM products ORDER BY id LIMIT ?1")
            .map_err(unavailable)?;
        let rows = stmt
            .query_map(params![limit as i64], Self::row_to_summary)
            .map_err(unavailable)?;
        let products = rows.collect::<rusqlite::Result<Vec<_>>>().map_err(unavailable)?;
        Ok(products)
    }

    fn fetch_all_with_embeddings(&self) -> Result<Vec<Product>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT id, name, description, price, embedding FROM products ORDER BY id")
            .map_err(unavailable)?;
        let rows = stmt.query_map([], Self::row_to_product).map_err(unavailable)?;
        let products = rows.collect::<rusqlite::Result<Vec<_>>>().map_err(unavailable)?;
        Ok(products)
    }

    fn search_by_name_substring(&self, text: &str, limit: usize) -> Result<Vec<ProductSummary>> {
        // SQLite's LIKE only folds ASCII case, so matching happens here to
        // cover accented names.
        let needle = text.to_lowercase();
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT id, name, description, price FROM products ORDER BY id")
            .map_err(unavailable)?;
        let rows = stmt.query_map([], Self::row_to_summary).map_err(unavailable)?;

        let mut matches = Vec::new();
        for row in rows {
            if matches.len() >= limit {
                break;
            }
            let product = row.map_err(unavailable)?;
            if product.name.to_lowercase().contains(&needle) {
                matches.push(product);
            }
        }
        Ok(matches)
    }
}
