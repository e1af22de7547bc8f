//! Configuration and data directory management.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::{DEFAULT_EMBEDDING_MODEL, EMBEDDING_DIM, TOP_K};

/// Default OpenAI-compatible API root.
pub const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com/v1";

/// Default bound on a single embedding request.
pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 15;

/// Paths to the Volanti data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// SQLite catalog file (`data/volanti.db`).
    pub catalog_db: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            catalog_db: root.join("volanti.db"),
            root,
        })
    }
}

/// Settings for the hosted embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// API key; when absent the search engine runs on substring matching only.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub model: String,
    /// API root; `/embeddings` is appended.
    pub base_url: String,
    pub timeout_secs: u64,
    /// Vector size agreed with the batch embedding job.
    pub dimension: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_EMBEDDING_MODEL.into(),
            base_url: DEFAULT_EMBEDDING_URL.into(),
            timeout_secs: DEFAULT_EMBEDDING_TIMEOUT_SECS,
            dimension: EMBEDDING_DIM,
        }
    }
}

/// Settings for the product search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Maximum number of products returned.
    pub top_k: usize,
    /// Embedding attempts per search. `1` means no retry.
    pub embed_attempts: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            top_k: TOP_K,
            embed_attempts: 1,
        }
    }
}

/// Top-level Volanti configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolantiConfig {
    pub data_paths: DataPaths,
    pub embedding: EmbeddingSettings,
    pub search: SearchSettings,
}

impl VolantiConfig {
    /// Create configuration from the process environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("VOLANTI_DATA_DIR").unwrap_or_else(|| "data".to_string());
        let data_paths = DataPaths::new(&data_dir)?;

        let defaults = EmbeddingSettings::default();
        let embedding = EmbeddingSettings {
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            model: lookup("VOLANTI_EMBEDDING_MODEL").unwrap_or(defaults.model),
            base_url: lookup("VOLANTI_EMBEDDING_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout_secs: parse_var(&lookup, "VOLANTI_EMBEDDING_TIMEOUT_SECS")?
                .unwrap_or(defaults.timeout_secs),
            dimension: parse_var(&lookup, "VOLANTI_EMBEDDING_DIM")?.unwrap_or(defaults.dimension),
        };

        let search = SearchSettings {
            top_k: parse_top_k(&lookup)?,
            embed_attempts: parse_var(&lookup, "VOLANTI_EMBED_ATTEMPTS")?.unwrap_or(1),
        };

        debug!(
            "Config: data_dir={}, model={}, top_k={}, embed_attempts={}",
            data_paths.root.display(),
            embedding.model,
            search.top_k,
            search.embed_attempts
        );

        Ok(Self {
            data_paths,
            embedding,
            search,
        })
    }
}

/// Result size may be lowered from `TOP_K`, never raised.
fn parse_top_k<F>(lookup: &F) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_var::<F, usize>(lookup, "VOLANTI_SEARCH_TOP_K")? {
        Some(k) if (1..=TOP_K).contains(&k) => Ok(k),
        Some(k) => Err(Error::Config(format!(
            "VOLANTI_SEARCH_TOP_K must be between 1 and {}, got {}",
            TOP_K, k
        ))),
        None => Ok(TOP_K),
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has invalid value '{}'", key, raw))),
        None => Ok(None),
    }
}
