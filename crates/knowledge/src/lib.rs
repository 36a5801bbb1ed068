//! Knowledge base management and evidence sources.
//!
//! Provides the `Document` model, a local SQLite-backed retriever with MMR
//! reranking, a web search client, and index population from local files.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod mmr;
pub mod parser;
pub mod retriever;
pub mod types;
pub mod web;

#[cfg(test)]
mod tests;

pub use retriever::{IndexRetriever, Retriever};
pub use types::{
    BaseStats, Document, KnowledgeBaseConfig, KnowledgeChunk, KnowledgeSource, LearnOptions,
    LearnStats,
};
pub use web::{TavilyClient, WebSearch, WebSnippet};

use arag_core::{AppError, AppResult};
use chrono::Utc;
use embeddings::EmbeddingProvider;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Learn from local files and populate the knowledge base.
///
/// Files that cannot be read as text are skipped and reported in
/// [`LearnStats::skipped`]. Embedding failures abort the run.
pub async fn learn(
    workspace: &Path,
    options: LearnOptions,
    embedding_endpoint: Option<&str>,
) -> AppResult<LearnStats> {
    let start = Instant::now();

    tracing::info!("Starting learn operation for base '{}'", options.base_name);

    let mut config = config::load_config(workspace, &options.base_name)?;
    if let Some(provider) = &options.embedding_provider {
        config.provider = provider.clone();
    }
    if let Some(model) = &options.embedding_model {
        config.model = model.clone();
    }

    let index_path = config::get_index_path(workspace, &options.base_name);
    let conn = index::init_index(&index_path)?;

    if options.reset {
        tracing::info!("Resetting knowledge base '{}'", options.base_name);
        index::reset_index(&conn)?;
    } else {
        ensure_same_embedder(workspace, &config, &conn)?;
    }

    let embedder = embeddings::create_provider(&config, embedding_endpoint)?;

    let mut stats = LearnStats {
        sources_count: 0,
        chunks_count: 0,
        bytes_processed: 0,
        skipped: Vec::new(),
        duration_secs: 0.0,
    };

    for path in collect_files(&options)? {
        let text = match parser::parse_file(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                stats.skipped.push(path);
                continue;
            }
        };

        let chunks = process_file(&conn, embedder.as_ref(), &config, &path, &text).await?;
        stats.sources_count += 1;
        stats.chunks_count += chunks;
        stats.bytes_processed += text.len() as u64;
    }

    config::save_config(workspace, &config)?;

    stats.duration_secs = start.elapsed().as_secs_f64();

    tracing::info!(
        "Learn operation completed: {} sources, {} chunks, {} bytes in {:.2}s",
        stats.sources_count,
        stats.chunks_count,
        stats.bytes_processed,
        stats.duration_secs
    );

    Ok(stats)
}

/// Refuse to mix embeddings from different providers in one index.
fn ensure_same_embedder(
    workspace: &Path,
    config: &KnowledgeBaseConfig,
    conn: &rusqlite::Connection,
) -> AppResult<()> {
    let (_, chunks, _) = index::get_stats(conn)?;
    if chunks == 0 {
        return Ok(());
    }

    let stored = config::load_config(workspace, &config.name)?;
    if stored.provider != config.provider || stored.model != config.model {
        return Err(AppError::Knowledge(format!(
            "Base '{}' was learned with {}/{}; pass --reset to re-learn with {}/{}",
            config.name, stored.provider, stored.model, config.provider, config.model
        )));
    }

    Ok(())
}

/// Expand the requested paths into the list of files to learn.
fn collect_files(options: &LearnOptions) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in &options.paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && should_include(entry_path, options) {
                    files.push(entry_path.to_path_buf());
                }
            }
        } else {
            return Err(AppError::Knowledge(format!(
                "Path does not exist: {:?}",
                path
            )));
        }
    }

    Ok(files)
}

async fn process_file(
    conn: &rusqlite::Connection,
    embedder: &dyn EmbeddingProvider,
    config: &KnowledgeBaseConfig,
    path: &Path,
    text: &str,
) -> AppResult<u32> {
    tracing::debug!("Processing file: {:?}", path);

    let size_bytes = text.len() as u64;

    let source_id = uuid::Uuid::new_v4().to_string();
    let candidates = chunker::chunk_text(
        &source_id,
        text,
        config.chunk_size as usize,
        config.chunk_overlap as usize,
    )?;

    let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;

    let source = KnowledgeSource {
        id: source_id,
        path: path.to_path_buf(),
        content_type: parser::ContentType::from_path(path).as_str().to_string(),
        learned_at: Utc::now(),
        size_bytes,
    };
    index::insert_source(conn, &source)?;

    let mut chunks_count = 0u32;
    for (candidate, embedding) in candidates.into_iter().zip(embeddings) {
        let chunk = KnowledgeChunk {
            id: uuid::Uuid::new_v4().to_string(),
            source_id: candidate.source_id,
            position: candidate.position,
            text: candidate.text,
            embedding: Some(embedding),
            metadata: candidate.metadata,
        };

        index::insert_chunk(conn, &chunk)?;
        chunks_count += 1;
    }

    tracing::debug!(
        "Processed {:?}: {} chunks, {} bytes",
        path,
        chunks_count,
        size_bytes
    );

    Ok(chunks_count)
}

/// Excludes win over includes; with no includes everything passes.
fn should_include(path: &Path, options: &LearnOptions) -> bool {
    let path_str = path.to_string_lossy();

    if options.exclude.iter().any(|p| path_str.contains(p.as_str())) {
        return false;
    }

    options.include.is_empty() || options.include.iter().any(|p| path_str.contains(p.as_str()))
}

/// Delete every source and chunk in a knowledge base.
pub fn clean(workspace: &Path, base_name: &str) -> AppResult<()> {
    tracing::info!("Cleaning knowledge base '{}'", base_name);

    let index_path = existing_index(workspace, base_name)?;
    let conn = index::init_index(&index_path)?;
    index::reset_index(&conn)?;

    tracing::info!("Knowledge base '{}' cleaned", base_name);
    Ok(())
}

/// Get statistics for a knowledge base.
pub fn stats(workspace: &Path, base_name: &str) -> AppResult<BaseStats> {
    let index_path = existing_index(workspace, base_name)?;
    let conn = index::init_index(&index_path)?;
    let (sources_count, chunks_count, last_learn_at) = index::get_stats(&conn)?;

    let db_size_bytes = std::fs::metadata(&index_path).map(|m| m.len()).unwrap_or(0);

    Ok(BaseStats {
        base_name: base_name.to_string(),
        sources_count,
        chunks_count,
        db_size_bytes,
        last_learn_at,
    })
}

fn existing_index(workspace: &Path, base_name: &str) -> AppResult<PathBuf> {
    let index_path = config::get_index_path(workspace, base_name);
    if !index_path.exists() {
        return Err(AppError::Knowledge(format!(
            "Knowledge base '{}' does not exist",
            base_name
        )));
    }
    Ok(index_path)
}
