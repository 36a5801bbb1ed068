//! SQLite-backed vector index for knowledge chunks.

use crate::types::{KnowledgeChunk, KnowledgeSource};
use arag_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

/// Open (and create if needed) the SQLite index database.
pub fn init_index(db_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sources (
            id TEXT PRIMARY KEY,
            path TEXT NOT NULL,
            content_type TEXT NOT NULL,
            learned_at TEXT NOT NULL,
            size_bytes INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            source_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT,
            FOREIGN KEY (source_id) REFERENCES sources(id)
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source_id);
        "#,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

    tracing::debug!("Initialized SQLite index at {:?}", db_path);
    Ok(conn)
}

/// Insert a source into the index.
pub fn insert_source(conn: &Connection, source: &KnowledgeSource) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO sources (id, path, content_type, learned_at, size_bytes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            source.id,
            source.path.to_string_lossy().to_string(),
            source.content_type,
            source.learned_at.to_rfc3339(),
            source.size_bytes as i64,
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert source: {}", e)))?;

    Ok(())
}

/// Insert a chunk with embedding into the index.
pub fn insert_chunk(conn: &Connection, chunk: &KnowledgeChunk) -> AppResult<()> {
    let embedding = chunk
        .embedding
        .as_ref()
        .ok_or_else(|| AppError::Knowledge("Chunk missing embedding".to_string()))?;

    let metadata_json = serde_json::to_string(&chunk.metadata)
        .map_err(|e| AppError::Knowledge(format!("Failed to serialize metadata: {}", e)))?;

    conn.execute(
        "INSERT OR REPLACE INTO chunks (id, source_id, position, text, embedding, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            chunk.id,
            chunk.source_id,
            chunk.position as i64,
            chunk.text,
            embedding_to_bytes(embedding),
            metadata_json,
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;

    Ok(())
}

/// A chunk scored against a query, with the path of its source.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: KnowledgeChunk,
    pub source_path: String,
    pub score: f32,
}

/// Return the `top_k` chunks most similar to `query_embedding`, best first.
///
/// Returned chunks carry their embeddings so callers can rerank them.
pub fn query_chunks(
    conn: &Connection,
    query_embedding: &[f32],
    top_k: usize,
) -> AppResult<Vec<ScoredChunk>> {
    let mut stmt = conn
        .prepare(
            "SELECT c.id, c.source_id, c.position, c.text, c.embedding, c.metadata, s.path
             FROM chunks c JOIN sources s ON s.id = c.source_id",
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map([], |row| {
            let embedding_bytes: Vec<u8> = row.get(4)?;
            let metadata_json: Option<String> = row.get(5)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                embedding_bytes,
                metadata_json,
                row.get::<_, String>(6)?,
            ))
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

    let mut results = Vec::new();
    for row in rows {
        let (id, source_id, position, text, embedding_bytes, metadata_json, source_path) =
            row.map_err(|e| AppError::Knowledge(format!("Failed to read chunk row: {}", e)))?;

        let embedding = bytes_to_embedding(&embedding_bytes)?;
        let metadata = match metadata_json {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                AppError::Knowledge(format!("Corrupt metadata for chunk {}: {}", id, e))
            })?,
            None => serde_json::Value::Null,
        };

        let score = cosine_similarity(query_embedding, &embedding);
        results.push(ScoredChunk {
            chunk: KnowledgeChunk {
                id,
                source_id,
                position: position as u32,
                text,
                embedding: Some(embedding),
                metadata,
            },
            source_path,
            score,
        });
    }

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(top_k);

    tracing::debug!(
        "Retrieved {} chunks (requested top-{})",
        results.len(),
        top_k
    );

    Ok(results)
}

/// Source and chunk counts plus the latest learn time.
pub fn get_stats(conn: &Connection) -> AppResult<(u32, u32, Option<DateTime<Utc>>)> {
    let sources_count: u32 = conn
        .query_row("SELECT COUNT(*) FROM sources", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to count sources: {}", e)))?;

    let chunks_count: u32 = conn
        .query_row("SELECT COUNT(*) FROM chunks", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to count chunks: {}", e)))?;

    let last_learn: Option<String> = conn
        .query_row("SELECT MAX(learned_at) FROM sources", [], |row| row.get(0))
        .map_err(|e| AppError::Knowledge(format!("Failed to read learn time: {}", e)))?;

    let last_learn_at = last_learn
        .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
        .map(|ts| ts.with_timezone(&Utc));

    Ok((sources_count, chunks_count, last_learn_at))
}

/// Delete all sources and chunks.
pub fn reset_index(conn: &Connection) -> AppResult<()> {
    conn.execute("DELETE FROM chunks", [])
        .map_err(|e| AppError::Knowledge(format!("Failed to delete chunks: {}", e)))?;

    conn.execute("DELETE FROM sources", [])
        .map_err(|e| AppError::Knowledge(format!("Failed to delete sources: {}", e)))?;

    tracing::info!("Reset knowledge base index");
    Ok(())
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn source(id: &str) -> KnowledgeSource {
        KnowledgeSource {
            id: id.to_string(),
            path: PathBuf::from(format!("docs/{}.md", id)),
            content_type: "markdown".to_string(),
            learned_at: Utc::now(),
            size_bytes: 100,
        }
    }

    fn chunk(id: &str, source_id: &str, embedding: Vec<f32>) -> KnowledgeChunk {
        KnowledgeChunk {
            id: id.to_string(),
            source_id: source_id.to_string(),
            position: 0,
            text: format!("text of {}", id),
            embedding: Some(embedding),
            metadata: serde_json::json!({"start": 0, "end": 10}),
        }
    }

    #[test]
    fn test_init_index_creates_tables() {
        let temp = TempDir::new().unwrap();
        let conn = init_index(&temp.path().join("nested/index.db")).unwrap();

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 2);
    }

    #[test]
    fn test_query_orders_by_similarity() {
        let temp = TempDir::new().unwrap();
        let conn = init_index(&temp.path().join("index.db")).unwrap();

        insert_source(&conn, &source("s1")).unwrap();
        insert_chunk(&conn, &chunk("far", "s1", vec![0.0, 1.0, 0.0])).unwrap();
        insert_chunk(&conn, &chunk("near", "s1", vec![1.0, 0.1, 0.0])).unwrap();
        insert_chunk(&conn, &chunk("exact", "s1", vec![1.0, 0.0, 0.0])).unwrap();

        let results = query_chunks(&conn, &[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "exact");
        assert_eq!(results[1].chunk.id, "near");
        assert_eq!(results[0].source_path, "docs/s1.md");
        assert!(results[0].chunk.embedding.is_some());
    }

    #[test]
    fn test_stats_and_reset() {
        let temp = TempDir::new().unwrap();
        let conn = init_index(&temp.path().join("index.db")).unwrap();

        insert_source(&conn, &source("s1")).unwrap();
        insert_chunk(&conn, &chunk("c1", "s1", vec![1.0])).unwrap();

        let (sources, chunks, last) = get_stats(&conn).unwrap();
        assert_eq!((sources, chunks), (1, 1));
        assert!(last.is_some());

        reset_index(&conn).unwrap();
        let (sources, chunks, last) = get_stats(&conn).unwrap();
        assert_eq!((sources, chunks), (0, 0));
        assert!(last.is_none());
    }

    #[test]
    fn test_insert_chunk_without_embedding_fails() {
        let temp = TempDir::new().unwrap();
        let conn = init_index(&temp.path().join("index.db")).unwrap();
        let mut c = chunk("c1", "s1", vec![]);
        c.embedding = None;

        assert!(insert_chunk(&conn, &c).is_err());
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
