//! Text chunking with configurable size and overlap.

use crate::types::ChunkCandidate;
use arag_core::{AppError, AppResult};
use text_splitter::{ChunkConfig, TextSplitter};

/// Split text into overlapping chunks of at most `chunk_size` characters.
///
/// Splitting prefers semantic boundaries (paragraphs, sentences, words) and
/// records the byte range of each chunk in its metadata.
pub fn chunk_text(
    source_id: &str,
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> AppResult<Vec<ChunkCandidate>> {
    let config = ChunkConfig::new(chunk_size)
        .with_overlap(overlap)
        .map_err(|e| AppError::Knowledge(format!("Invalid chunk configuration: {}", e)))?;
    let splitter = TextSplitter::new(config);

    let chunks: Vec<ChunkCandidate> = splitter
        .chunk_indices(text)
        .filter(|(_, chunk)| !chunk.trim().is_empty())
        .enumerate()
        .map(|(position, (start, chunk))| ChunkCandidate {
            source_id: source_id.to_string(),
            position: position as u32,
            text: chunk.to_string(),
            metadata: serde_json::json!({
                "start": start,
                "end": start + chunk.len(),
            }),
        })
        .collect();

    tracing::debug!(
        "Chunked text into {} chunks (size: {}, overlap: {})",
        chunks.len(),
        chunk_size,
        overlap
    );

    Ok(chunks)
}
