//! Volanti Core: shared error type, configuration, and constants.

pub mod config;
pub mod error;

pub use config::{DataPaths, EmbeddingSettings, SearchSettings, VolantiConfig};
pub use error::{Error, Result};

/// Number of products a search returns at most.
pub const TOP_K: usize = 5;

/// Output size of `text-embedding-ada-002`, shared with the batch embedding job.
pub const EMBEDDING_DIM: usize = 1536;

/// Embedding model used when none is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
