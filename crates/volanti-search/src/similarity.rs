//! Cosine similarity ranking over product embeddings.

use std::cmp::Ordering;

use ndarray::ArrayView1;
use rayon::prelude::*;
use tracing::warn;
use volanti_store::Product;

/// A product paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub product: Product,
    pub score: f32,
}

/// Cosine similarity `(a·b) / (‖a‖·‖b‖)`.
///
/// Returns `0.0` instead of failing when either vector has zero magnitude,
/// the lengths differ, or the result is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        warn!(
            "Embedding dimension mismatch: {} vs {}",
            a.len(),
            b.len()
        );
        return 0.0;
    }

    let a = ArrayView1::from(a);
    let b = ArrayView1::from(b);
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = a.dot(&b) / (norm_a * norm_b);
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

/// Score every product that has a usable embedding and keep the best `k`.
///
/// Products without an embedding (missing or empty) are dropped rather than
/// scored. Equal scores keep the order the products were given in.
pub fn rank_top_k(query: &[f32], candidates: Vec<Product>, k: usize) -> Vec<ScoredCandidate> {
    let eligible: Vec<Product> = candidates
        .into_iter()
        .filter(|p| {
            let usable = p.usable_embedding().is_some();
            if !usable {
                warn!("Product {} has no embedding", p.id);
            }
            usable
        })
        .collect();

    let scores: Vec<f32> = eligible
        .par_iter()
        .map(|p| cosine_similarity(query, p.usable_embedding().unwrap_or(&[])))
        .collect();

    let mut scored: Vec<ScoredCandidate> = eligible
        .into_iter()
        .zip(scores)
        .map(|(product, score)| ScoredCandidate { product, score })
        .collect();

    // `sort_by` is stable, which keeps ties in fetch order.
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(k);
    scored
}
