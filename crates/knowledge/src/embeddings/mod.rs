//! Embedding providers for knowledge bases.
//!
//! A base's `config.yaml` names the provider and model used both when
//! learning and when querying; the two must match for scores to mean
//! anything.

pub mod providers;

use crate::types::KnowledgeBaseConfig;
use arag_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Provider name ("ollama", "trigram")
    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;

    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create the embedding provider a knowledge base is configured for.
///
/// `endpoint` overrides the Ollama base URL (taken from the LLM provider
/// config when present).
pub fn create_provider(
    config: &KnowledgeBaseConfig,
    endpoint: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    tracing::debug!(
        "Creating embedding provider for base '{}': provider={}, model={}, dimensions={}",
        config.name,
        config.provider,
        config.model,
        config.embedding_dim
    );

    match config.provider.as_str() {
        "ollama" => {
            let provider = providers::ollama::OllamaProvider::new(
                endpoint,
                &config.model,
                config.embedding_dim as usize,
            )?;
            Ok(Arc::new(provider))
        }
        "trigram" => Ok(Arc::new(providers::trigram::TrigramProvider::new(
            config.embedding_dim as usize,
        ))),
        other => Err(AppError::Knowledge(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, trigram",
            other
        ))),
    }
}
