//! OpenAI-compatible `/embeddings` client.
//!
//! Blocking, one request per call, bounded by the configured timeout.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use crate::embedder::EmbeddingProvider;
use volanti_core::{EmbeddingSettings, Error, Result};

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedding provider backed by an OpenAI-compatible HTTP API.
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    dim: usize,
}

impl OpenAiEmbedder {
    /// Build a client for `settings` authenticated with `api_key`.
    pub fn new(settings: &EmbeddingSettings, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", settings.base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: settings.model.clone(),
            dim: settings.dimension,
        })
    }

    /// Endpoint the requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl EmbeddingProvider for OpenAiEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Requesting embedding from {} with model {}", self.endpoint, self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": self.model, "input": text }))
            .send()
            .map_err(|e| {
                error!("Embedding request failed: {}", e);
                Error::Embedding(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::Embedding(format!("Response read error: {}", e)))?;
        check_status(status, &body)?;

        let embedding = parse_embedding_response(&body, self.dim)?;
        let preview: String = text.chars().take(30).collect();
        info!("Generated embedding for query: {}...", preview);
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Reject a non-2xx response, keeping the body for the error message.
pub fn check_status(status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    error!("Embedding API error {}", status);
    Err(Error::Embedding(format!("API error {}: {}", status, body)))
}

/// Extract `data[0].embedding` from a response body and check its length.
pub fn parse_embedding_response(body: &str, expected_dim: usize) -> Result<Vec<f32>> {
    let parsed: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| Error::Embedding(format!("Malformed response: {}", e)))?;
    let embedding = parsed
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| Error::Embedding("Malformed response: empty data".into()))?;
    if embedding.len() != expected_dim {
        return Err(Error::Embedding(format!(
            "Malformed response: expected {} dimensions, got {}",
            expected_dim,
            embedding.len()
        )));
    }
    Ok(embedding)
}
