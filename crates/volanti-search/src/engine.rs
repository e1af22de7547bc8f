//! Product search with fallback tiers.
//!
//! 1. No query: the first `top_k` products in storage order.
//! 2. Query embedded: rank every embedded product by cosine similarity.
//! 3. Embedding failed: case-insensitive substring match on the name.
//!
//! A store failure in any tier ends the search with [`SearchOutcome::Failed`].
//! A failed similarity fetch does not fall through to the substring tier.

use tracing::{debug, error, info, warn};
use volanti_core::{Result, TOP_K};
use volanti_infer::EmbeddingProvider;
use volanti_store::CatalogStore;

use crate::similarity::{rank_top_k, ScoredCandidate};
use crate::types::{SearchConfig, SearchOutcome, SearchTier};

/// Search engine over a catalog and an embedding provider.
///
/// Holds no state between calls; the same inputs against an unchanged
/// catalog give the same result.
pub struct ProductSearchEngine<'a> {
    store: &'a dyn CatalogStore,
    embedder: &'a dyn EmbeddingProvider,
    config: SearchConfig,
}

impl<'a> ProductSearchEngine<'a> {
    pub fn new(store: &'a dyn CatalogStore, embedder: &'a dyn EmbeddingProvider) -> Self {
        Self::with_config(store, embedder, SearchConfig::default())
    }

    pub fn with_config(
        store: &'a dyn CatalogStore,
        embedder: &'a dyn EmbeddingProvider,
        config: SearchConfig,
    ) -> Self {
        let config = SearchConfig {
            top_k: config.top_k.min(TOP_K),
            ..config
        };
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Run a search. Absent, empty and whitespace-only queries list the
    /// catalog instead of searching.
    pub fn search(&self, query: Option<&str>) -> SearchOutcome {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let Some(query) = query else {
            return self.catalog_tier();
        };

        match self.embed_query(query) {
            Ok(embedding) => self.semantic_tier(&embedding),
            Err(e) => {
                warn!("Falling back to name search: {}", e);
                self.substring_tier(query)
            }
        }
    }

    /// Semantic ranking with scores, for diagnostics. Unlike [`search`],
    /// errors are returned rather than turned into a fallback.
    ///
    /// [`search`]: Self::search
    pub fn search_scored(&self, query: &str) -> Result<Vec<ScoredCandidate>> {
        let embedding = self.embed_query(query.trim())?;
        let candidates = self.store.fetch_all_with_embeddings()?;
        Ok(rank_top_k(&embedding, candidates, self.config.top_k))
    }

    fn catalog_tier(&self) -> SearchOutcome {
        match self.store.fetch_top_products(self.config.top_k) {
            Ok(products) => {
                info!("Listing {} catalog products", products.len());
                SearchOutcome::Found {
                    tier: SearchTier::Catalog,
                    products,
                }
            }
            Err(e) => {
                error!("Catalog listing failed: {}", e);
                SearchOutcome::failed()
            }
        }
    }

    fn semantic_tier(&self, embedding: &[f32]) -> SearchOutcome {
        let candidates = match self.store.fetch_all_with_embeddings() {
            Ok(candidates) => candidates,
            Err(e) => {
                error!("Semantic search failed: {}", e);
                return SearchOutcome::failed();
            }
        };
        let scanned = candidates.len();
        let ranked = rank_top_k(embedding, candidates, self.config.top_k);
        info!(
            "Semantic search ranked {} of {} products",
            ranked.len(),
            scanned
        );
        SearchOutcome::Found {
            tier: SearchTier::Semantic,
            products: ranked
                .into_iter()
                .map(|c| c.product.into_summary())
                .collect(),
        }
    }

    fn substring_tier(&self, query: &str) -> SearchOutcome {
        match self.store.search_by_name_substring(query, self.config.top_k) {
            Ok(products) => {
                info!("Name search matched {} products", products.len());
                SearchOutcome::Found {
                    tier: SearchTier::Substring,
                    products,
                }
            }
            Err(e) => {
                error!("Name search failed: {}", e);
                SearchOutcome::failed()
            }
        }
    }

    fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let attempts = self.config.embed_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.embedder.embed(query) {
                Ok(embedding) => return Ok(embedding),
                Err(e) if attempt < attempts => {
                    debug!(
                        "Embedding attempt {}/{} with {} failed: {}",
                        attempt,
                        attempts,
                        self.embedder.model_id(),
                        e
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use volanti_core::Error;
    use volanti_store::{Product, ProductSummary};

    struct FakeEmbedder {
        result: Option<Vec<f32>>,
        succeed_on: Option<usize>,
        calls: AtomicUsize,
    }

    impl FakeEmbedder {
        fn returning(embedding: Vec<f32>) -> Self {
            Self {
                result: Some(embedding),
                succeed_on: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                result: None,
                succeed_on: None,
                calls: AtomicUsize::new(0),
            }
        }

        /// Fails until call number `n`, then returns `embedding`.
        fn flaky(embedding: Vec<f32>, n: usize) -> Self {
            Self {
                result: Some(embedding),
                succeed_on: Some(n),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EmbeddingProvider for FakeEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(n) = self.succeed_on {
                if call < n {
                    return Err(Error::Embedding("timeout".into()));
                }
            }
            self.result
                .clone()
                .ok_or_else(|| Error::Embedding("timeout".into()))
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_id(&self) -> &str {
            "fake"
        }
    }

    #[derive(Default)]
    struct MemoryCatalog {
        products: Vec<Product>,
        fail_top: bool,
        fail_vectors: bool,
        fail_substring: bool,
        substring_calls: AtomicUsize,
    }

    impl MemoryCatalog {
        fn with_products(products: Vec<Product>) -> Self {
            Self {
                products,
                ..Default::default()
            }
        }
    }

    impl CatalogStore for MemoryCatalog {
        fn fetch_top_products(&self, limit: usize) -> Result<Vec<ProductSummary>> {
            if self.fail_top {
                return Err(Error::StoreUnavailable("down".into()));
            }
            Ok(self
                .products
                .iter()
                .take(limit)
                .cloned()
                .map(Product::into_summary)
                .collect())
        }

        fn fetch_all_with_embeddings(&self) -> Result<Vec<Product>> {
            if self.fail_vectors {
                return Err(Error::StoreUnavailable("down".into()));
            }
            Ok(self.products.clone())
        }

        fn search_by_name_substring(&self, text: &str, limit: usize) -> Result<Vec<ProductSummary>> {
            self.substring_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_substring {
                return Err(Error::StoreUnavailable("down".into()));
            }
            let needle = text.to_lowercase();
            Ok(self
                .products
                .iter()
                .filter(|p| p.name.to_lowercase().contains(&needle))
                .take(limit)
                .cloned()
                .map(Product::into_summary)
                .collect())
        }
    }

    fn product(id: i64, name: &str, embedding: Option<Vec<f32>>) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: format!("{} description", name),
            price: 10.0 + id as f64,
            embedding,
        }
    }

    fn furniture() -> Vec<Product> {
        vec![
            product(1, "Lampara de mesa", Some(vec![1.0, 0.0])),
            product(2, "Silla", Some(vec![0.0, 1.0])),
            product(3, "Mesa", None),
        ]
    }

    fn many(n: i64) -> Vec<Product> {
        (1..=n)
            .map(|id| product(id, &format!("Lampara {}", id), Some(vec![1.0, id as f32])))
            .collect()
    }

    fn ids(outcome: &SearchOutcome) -> Vec<i64> {
        outcome
            .products()
            .unwrap_or_default()
            .iter()
            .map(|p| p.id)
            .collect()
    }

    #[test]
    fn test_no_query_lists_catalog_without_embedding() {
        let store = MemoryCatalog::with_products(many(7));
        let embedder = FakeEmbedder::returning(vec![1.0, 0.0]);
        let engine = ProductSearchEngine::new(&store, &embedder);

        for query in [None, Some(""), Some("   ")] {
            let outcome = engine.search(query);
            assert_eq!(outcome.tier(), Some(SearchTier::Catalog));
            assert_eq!(ids(&outcome), vec![1, 2, 3, 4, 5]);
        }
        assert_eq!(embedder.calls(), 0);
        assert_eq!(store.substring_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_catalog_failure() {
        let store = MemoryCatalog {
            fail_top: true,
            ..MemoryCatalog::with_products(many(3))
        };
        let embedder = FakeEmbedder::returning(vec![1.0, 0.0]);
        let engine = ProductSearchEngine::new(&store, &embedder);

        let outcome = engine.search(None);
        assert_eq!(outcome, SearchOutcome::failed());
    }

    #[test]
    fn test_semantic_ranking() {
        let store = MemoryCatalog::with_products(furniture());
        let embedder = FakeEmbedder::returning(vec![1.0, 0.0]);
        let engine = ProductSearchEngine::new(&store, &embedder);

        let outcome = engine.search(Some("lampara"));
        assert_eq!(outcome.tier(), Some(SearchTier::Semantic));
        assert_eq!(ids(&outcome), vec![1, 2]);
        assert_eq!(embedder.calls(), 1);
        assert_eq!(store.substring_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_semantic_results_capped_at_top_k() {
        let store = MemoryCatalog::with_products(many(12));
        let embedder = FakeEmbedder::returning(vec![0.0, 1.0]);
        let engine = ProductSearchEngine::new(&store, &embedder);

        let outcome = engine.search(Some("lampara"));
        assert_eq!(outcome.products().map(|p| p.len()), Some(5));
        // Closest to the y axis is the product with the largest id.
        assert_eq!(ids(&outcome)[0], 12);
    }

    #[test]
    fn test_top_k_never_exceeds_limit() {
        let store = MemoryCatalog::with_products(many(20));
        let embedder = FakeEmbedder::failing();
        let config = SearchConfig {
            top_k: 12,
            ..Default::default()
        };
        let engine = ProductSearchEngine::with_config(&store, &embedder, config);

        assert_eq!(engine.search(None).products().map(|p| p.len()), Some(TOP_K));
        let outcome = engine.search(Some("lampara"));
        assert_eq!(outcome.tier(), Some(SearchTier::Substring));
        assert_eq!(outcome.products().map(|p| p.len()), Some(TOP_K));
    }

    #[test]
    fn test_lower_top_k_is_honored() {
        let store = MemoryCatalog::with_products(many(20));
        let embedder = FakeEmbedder::returning(vec![1.0, 0.0]);
        let config = SearchConfig {
            top_k: 2,
            ..Default::default()
        };
        let engine = ProductSearchEngine::with_config(&store, &embedder, config);

        assert_eq!(ids(&engine.search(None)), vec![1, 2]);
        assert_eq!(engine.search(Some("lampara")).products().map(|p| p.len()), Some(2));
    }

    #[test]
    fn test_embedding_failure_falls_back_to_name_search() {
        let store = MemoryCatalog::with_products(furniture());
        let embedder = FakeEmbedder::failing();
        let engine = ProductSearchEngine::new(&store, &embedder);

        let outcome = engine.search(Some("  SILLA "));
        assert_eq!(outcome.tier(), Some(SearchTier::Substring));
        assert_eq!(ids(&outcome), vec![2]);
        assert_eq!(embedder.calls(), 1);
        assert_eq!(store.substring_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_name_search_without_match_is_empty_not_failed() {
        let store = MemoryCatalog::with_products(furniture());
        let embedder = FakeEmbedder::failing();
        let engine = ProductSearchEngine::new(&store, &embedder);

        let outcome = engine.search(Some("televisor"));
        assert_eq!(outcome.tier(), Some(SearchTier::Substring));
        assert!(outcome.products().unwrap().is_empty());
    }

    #[test]
    fn test_vector_fetch_failure_does_not_fall_back() {
        let store = MemoryCatalog {
            fail_vectors: true,
            ..MemoryCatalog::with_products(furniture())
        };
        let embedder = FakeEmbedder::returning(vec![1.0, 0.0]);
        let engine = ProductSearchEngine::new(&store, &embedder);

        let outcome = engine.search(Some("lampara"));
        assert!(outcome.is_failed());
        assert_eq!(store.substring_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_name_search_failure() {
        let store = MemoryCatalog {
            fail_substring: true,
            ..MemoryCatalog::with_products(furniture())
        };
        let embedder = FakeEmbedder::failing();
        let engine = ProductSearchEngine::new(&store, &embedder);

        assert_eq!(engine.search(Some("silla")), SearchOutcome::failed());
    }

    #[test]
    fn test_repeated_searches_are_identical() {
        let store = MemoryCatalog::with_products(many(9));
        let embedder = FakeEmbedder::returning(vec![1.0, 0.5]);
        let engine = ProductSearchEngine::new(&store, &embedder);

        let first = engine.search(Some("lampara"));
        let second = engine.search(Some("lampara"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_attempt_by_default() {
        let store = MemoryCatalog::with_products(furniture());
        let embedder = FakeEmbedder::flaky(vec![1.0, 0.0], 2);
        let engine = ProductSearchEngine::new(&store, &embedder);

        let outcome = engine.search(Some("lampara"));
        assert_eq!(outcome.tier(), Some(SearchTier::Substring));
        assert_eq!(embedder.calls(), 1);
    }

    #[test]
    fn test_configured_retries() {
        let store = MemoryCatalog::with_products(furniture());
        let embedder = FakeEmbedder::flaky(vec![1.0, 0.0], 3);
        let config = SearchConfig {
            embed_attempts: 3,
            ..Default::default()
        };
        let engine = ProductSearchEngine::with_config(&store, &embedder, config);

        let outcome = engine.search(Some("lampara"));
        assert_eq!(outcome.tier(), Some(SearchTier::Semantic));
        assert_eq!(embedder.calls(), 3);
    }

    #[test]
    fn test_retries_exhausted() {
        let store = MemoryCatalog::with_products(furniture());
        let embedder = FakeEmbedder::failing();
        let config = SearchConfig {
            embed_attempts: 4,
            ..Default::default()
        };
        let engine = ProductSearchEngine::with_config(&store, &embedder, config);

        let outcome = engine.search(Some("silla"));
        assert_eq!(outcome.tier(), Some(SearchTier::Substring));
        assert_eq!(embedder.calls(), 4);
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let store = MemoryCatalog::with_products(furniture());
        let embedder = FakeEmbedder::failing();
        let config = SearchConfig {
            embed_attempts: 0,
            ..Default::default()
        };
        let engine = ProductSearchEngine::with_config(&store, &embedder, config);

        engine.search(Some("silla"));
        assert_eq!(embedder.calls(), 1);
    }

    #[test]
    fn test_search_scored() {
        let store = MemoryCatalog::with_products(furniture());
        let embedder = FakeEmbedder::returning(vec![1.0, 0.0]);
        let engine = ProductSearchEngine::new(&store, &embedder);

        let scored = engine.search_scored("lampara").unwrap();
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].product.id, 1);
        assert!((scored[0].score - 1.0).abs() < 1e-6);

        let failing = FakeEmbedder::failing();
        let engine = ProductSearchEngine::new(&store, &failing);
        assert!(matches!(
            engine.search_scored("lampara"),
            Err(Error::Embedding(_))
        ));
    }
}
