//! Search types.

use serde::{Deserialize, Serialize};
use volanti_core::{SearchSettings, TOP_K};
use volanti_store::ProductSummary;

/// Localized message shown when a search cannot be completed.
pub const SEARCH_ERROR_MESSAGE: &str = "Error al buscar productos.";

/// Strategy that produced a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTier {
    /// No query: first products in storage order.
    Catalog,
    /// Query embedded and ranked by cosine similarity.
    Semantic,
    /// Embedding failed: case-insensitive name match.
    Substring,
}

impl std::fmt::Display for SearchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog => write!(f, "catalog"),
            Self::Semantic => write!(f, "semantic"),
            Self::Substring => write!(f, "substring"),
        }
    }
}

/// Result of a search call. Never carries an error type: failures become a
/// displayable message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SearchOutcome {
    Found {
        tier: SearchTier,
        products: Vec<ProductSummary>,
    },
    Failed {
        message: String,
    },
}

impl SearchOutcome {
    pub(crate) fn failed() -> Self {
        Self::Failed {
            message: SEARCH_ERROR_MESSAGE.to_string(),
        }
    }

    /// Products, if the search succeeded.
    pub fn products(&self) -> Option<&[ProductSummary]> {
        match self {
            Self::Found { products, .. } => Some(products),
            Self::Failed { .. } => None,
        }
    }

    /// Tier that answered, if the search succeeded.
    pub fn tier(&self) -> Option<SearchTier> {
        match self {
            Self::Found { tier, .. } => Some(*tier),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Convert into a product list or the error message.
    pub fn into_result(self) -> Result<Vec<ProductSummary>, String> {
        match self {
            Self::Found { products, .. } => Ok(products),
            Self::Failed { message } => Err(message),
        }
    }
}

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum number of products returned; values above `TOP_K` are
    /// lowered to it.
    pub top_k: usize,
    /// Embedding attempts per search; `1` disables retry, `0` is read as `1`.
    pub embed_attempts: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: TOP_K,
            embed_attempts: 1,
        }
    }
}

impl From<&SearchSettings> for SearchConfig {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            top_k: settings.top_k.min(TOP_K),
            embed_attempts: settings.embed_attempts,
        }
    }
}
