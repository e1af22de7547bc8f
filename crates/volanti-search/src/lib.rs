//! Product search: embedding similarity ranking with graceful degradation.
//!
//! `ProductSearchEngine` resolves a query through one of three tiers:
//! catalog listing (no query), semantic ranking (query embedded), or name
//! matching (embedding unavailable). Store failures end the search with a
//! displayable error instead of falling further.

pub mod engine;
pub mod similarity;
pub mod types;

pub use engine::ProductSearchEngine;
pub use similarity::{cosine_similarity, rank_top_k, ScoredCandidate};
pub use types::*;
