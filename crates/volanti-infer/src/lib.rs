//! Volanti Infer: embedding provider boundary.
//!
//! Provides the `EmbeddingProvider` trait for turning query text into a
//! vector. When an API key is configured, `OpenAiEmbedder` calls an
//! OpenAI-compatible `/embeddings` endpoint. Without one,
//! `UnavailableEmbedder` is used and search falls back to name matching.

pub mod embedder;
pub mod openai;

pub use embedder::{EmbeddingProvider, UnavailableEmbedder};
pub use openai::OpenAiEmbedder;

use std::sync::Arc;

use volanti_core::EmbeddingSettings;

/// Create the best available embedding provider for the given settings.
///
/// Uses the HTTP provider when an API key is present and the client can be
/// built, otherwise falls back to `UnavailableEmbedder`.
pub fn create_embedder(settings: &EmbeddingSettings) -> Arc<dyn EmbeddingProvider> {
    match &settings.api_key {
        Some(key) => match OpenAiEmbedder::new(settings, key) {
            Ok(embedder) => {
                tracing::info!(
                    "Using embedding model {} (dim={})",
                    embedder.model_id(),
                    embedder.dimension()
                );
                return Arc::new(embedder);
            }
            Err(e) => {
                tracing::warn!("Embedding client unavailable: {}. Falling back to name search.", e);
            }
        },
        None => {
            tracing::info!("OPENAI_API_KEY not set. Searches will use name matching.");
        }
    }

    Arc::new(UnavailableEmbedder::new(settings.dimension))
}
