//! Embedding provider trait and the unconfigured fallback.
//!
//! Implementations make a single attempt per call and never substitute a
//! default vector on failure; deciding what to do about a failure is the
//! caller's job.

use volanti_core::{Error, Result};

/// Trait for embedding providers.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a text string.
    ///
    /// The text is passed through as-is; filtering out empty input is the
    /// caller's responsibility.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this provider returns.
    fn dimension(&self) -> usize;

    /// Model identifier, for logs.
    fn model_id(&self) -> &str;
}

/// Provider used when no embedding backend is configured. Every call fails.
pub struct UnavailableEmbedder {
    dim: usize,
}

impl UnavailableEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl EmbeddingProvider for UnavailableEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::Embedding("embedding provider not configured".into()))
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn model_id(&self) -> &str {
        "unavailable"
    }
}
