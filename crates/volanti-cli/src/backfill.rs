//! Embedding backfill for products stored without a vector.

use tracing::{error, info, warn};

use volanti_core::Result;
use volanti_infer::EmbeddingProvider;
use volanti_store::{ProductSummary, SqliteCatalog};

/// Outcome of a backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub embedded: usize,
    pub failed: usize,
}

/// Text sent to the embedding provider for a product.
pub fn product_text(product: &ProductSummary) -> String {
    format!("{} {}", product.name, product.description)
}

/// Embed up to `limit` products that have no embedding yet.
///
/// A failure on one product is logged and counted; the run continues with
/// the next one. Only a failure to list pending products is returned.
pub fn embed_pending_products(
    store: &SqliteCatalog,
    embedder: &dyn EmbeddingProvider,
    limit: usize,
) -> Result<BackfillReport> {
    let pending = store.products_without_embedding(limit)?;
    if pending.is_empty() {
        info!("All products already have embeddings");
        return Ok(BackfillReport::default());
    }

    info!(
        "Embedding {} products with {}",
        pending.len(),
        embedder.model_id()
    );

    let mut report = BackfillReport::default();
    for product in &pending {
        let embedding = match embedder.embed(&product_text(product)) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to embed product {}: {}", product.id, e);
                report.failed += 1;
                continue;
            }
        };
        match store.set_product_embedding(product.id, &embedding) {
            Ok(true) => report.embedded += 1,
            Ok(false) => {
                warn!("Product {} disappeared before its embedding was stored", product.id);
                report.failed += 1;
            }
            Err(e) => {
                error!("Failed to store embedding for product {}: {}", product.id, e);
                report.failed += 1;
            }
        }
    }

    info!(
        "Backfill finished: {} embedded, {} failed",
        report.embedded, report.failed
    );
    Ok(report)
}
