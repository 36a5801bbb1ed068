//! Ollama embedding provider.
//!
//! Calls the local `/api/embeddings` endpoint (one text per request) with
//! retry and exponential backoff.

use crate::embeddings::EmbeddingProvider;
use arag_core::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Maximum attempts per text
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a provider for `model` at `base_url` (or the default local URL).
    pub fn new(base_url: Option<&str>, model: &str, dimensions: usize) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Knowledge(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url
                .unwrap_or(DEFAULT_OLLAMA_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            dimensions,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed_with_retries(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut attempt = 0;

        loop {
            match self.embed_single(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        return Err(e);
                    }

                    let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                    warn!(
                        "Embedding failed (attempt {}/{}), retrying in {}ms: {}",
                        attempt, MAX_RETRIES, backoff_ms, e
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }

    async fn embed_single(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to reach Ollama at {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|r| r.error)
                .unwrap_or(error_text);

            return Err(AppError::Knowledge(format!(
                "Ollama embeddings error ({}): {}",
                status, message
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::Knowledge(format!("Failed to parse Ollama embedding response: {}", e))
        })?;

        if body.embedding.len() != self.dimensions {
            return Err(AppError::Knowledge(format!(
                "Model '{}' returned {} dimensions, expected {}",
                self.model,
                body.embedding.len(),
                self.dimensions
            )));
        }

        Ok(body.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(AppError::Knowledge("Cannot embed empty text".to_string()));
        }

        self.embed_with_retries(text).await
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        debug!("Embedding batch of {} texts", texts.len());

        let mut embeddings = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                warn!("Skipping empty text at index {}", i);
                embeddings.push(vec![0.0; self.dimensions]);
                continue;
            }

            embeddings.push(self.embed_with_retries(text).await?);
        }

        Ok(embeddings)
    }
}
