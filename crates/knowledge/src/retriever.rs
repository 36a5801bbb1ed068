//! Document retrieval over a learned knowledge base.

use crate::config::{get_index_path, load_config};
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::index::{init_index, query_chunks};
use crate::mmr;
use crate::types::Document;
use arag_core::config::RetrieverConfig;
use arag_core::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fetches documents relevant to a query.
///
/// Implementations are stateless from the caller's point of view and may be
/// shared across concurrent queries.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to the configured number of documents, best first.
    async fn fetch(&self, query: &str) -> AppResult<Vec<Document>>;
}

/// Retriever backed by a base's SQLite index, reranked with MMR.
#[derive(Debug)]
pub struct IndexRetriever {
    base_name: String,
    index_path: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    k: usize,
    fetch_k: usize,
    lambda_mult: f32,
}

impl IndexRetriever {
    /// Open the retriever for `config.knowledge_base` in `workspace`.
    ///
    /// Fails if the base has never been learned.
    pub fn open(
        workspace: &Path,
        config: &RetrieverConfig,
        embedding_endpoint: Option<&str>,
    ) -> AppResult<Self> {
        let base_name = &config.knowledge_base;
        let index_path = get_index_path(workspace, base_name);
        if !index_path.exists() {
            return Err(AppError::Knowledge(format!(
                "Knowledge base '{}' has no index; run `arag knowledge learn {}` first",
                base_name, base_name
            )));
        }

        let base_config = load_config(workspace, base_name)?;
        let embedder = create_provider(&base_config, embedding_endpoint)?;

        Ok(Self::with_embedder(index_path, base_name, embedder, config))
    }

    /// Build a retriever over an explicit index file and embedder.
    pub fn with_embedder(
        index_path: PathBuf,
        base_name: &str,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &RetrieverConfig,
    ) -> Self {
        Self {
            base_name: base_name.to_string(),
            index_path,
            embedder,
            k: config.k,
            fetch_k: config.fetch_k.max(config.k),
            lambda_mult: config.lambda_mult,
        }
    }
}

#[async_trait::async_trait]
impl Retriever for IndexRetriever {
    async fn fetch(&self, query: &str) -> AppResult<Vec<Document>> {
        let query_embedding = self.embedder.embed(query).await?;

        let conn = init_index(&self.index_path)?;
        let candidates = query_chunks(&conn, &query_embedding, self.fetch_k)?;

        let embeddings: Vec<Vec<f32>> = candidates
            .iter()
            .map(|c| c.chunk.embedding.clone().unwrap_or_default())
            .collect();
        let picked = mmr::select(&query_embedding, &embeddings, self.k, self.lambda_mult);

        let documents: Vec<Document> = picked
            .into_iter()
            .map(|i| {
                let scored = &candidates[i];
                Document::new(scored.chunk.text.clone())
                    .with_metadata("source", scored.source_path.clone())
                    .with_metadata("chunk_id", scored.chunk.id.clone())
                    .with_metadata("position", scored.chunk.position)
                    .with_metadata("score", scored.score as f64)
            })
            .collect();

        tracing::debug!(
            "Retrieved {} of {} candidates from base '{}'",
            documents.len(),
            candidates.len(),
            self.base_name
        );

        Ok(documents)
    }
}
