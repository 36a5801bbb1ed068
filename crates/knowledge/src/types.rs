//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A unit of evidence handed to the grader and the generator.
///
/// Produced by a retriever, or synthesized from web search snippets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Text the generator sees
    pub content: String,

    /// Provenance (source path, chunk id, score, url...)
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    /// Create a document without metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Read a string metadata entry.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// Configuration for a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBaseConfig {
    /// Name of the knowledge base
    pub name: String,

    /// Embedding provider ("ollama" or "trigram")
    pub provider: String,

    /// Embedding model
    pub model: String,

    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    /// Overlap between chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: u32,

    /// Embedding vector dimension
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: u32,
}

fn default_chunk_size() -> u32 {
    1000
}

fn default_chunk_overlap() -> u32 {
    200
}

fn default_embedding_dim() -> u32 {
    768
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            embedding_dim: default_embedding_dim(),
        }
    }
}

/// A source document in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSource {
    /// Unique source identifier
    pub id: String,

    /// Local file path
    pub path: PathBuf,

    /// Content type ("markdown", "html", "text", ...)
    pub content_type: String,

    /// When this source was indexed
    pub learned_at: DateTime<Utc>,

    /// Source size in bytes
    pub size_bytes: u64,
}

/// A text chunk with embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Unique chunk identifier
    pub id: String,

    /// Source document ID
    pub source_id: String,

    /// Position within source
    pub position: u32,

    /// Text content
    pub text: String,

    /// Embedding vector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Metadata (source path, byte offsets)
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Options for the learn operation.
#[derive(Debug, Clone)]
pub struct LearnOptions {
    /// Knowledge base name
    pub base_name: String,

    /// Local paths to learn from
    pub paths: Vec<PathBuf>,

    /// Include patterns (substring match)
    pub include: Vec<String>,

    /// Exclude patterns (substring match)
    pub exclude: Vec<String>,

    /// Reset the base before learning
    pub reset: bool,

    /// Embedding provider override for this base
    pub embedding_provider: Option<String>,

    /// Embedding model override for this base
    pub embedding_model: Option<String>,
}

/// Statistics from a learn operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnStats {
    /// Number of sources processed
    pub sources_count: u32,

    /// Number of chunks created
    pub chunks_count: u32,

    /// Total bytes processed
    pub bytes_processed: u64,

    /// Files that could not be parsed or embedded
    pub skipped: Vec<PathBuf>,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Statistics for a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseStats {
    /// Base name
    pub base_name: String,

    /// Number of sources
    pub sources_count: u32,

    /// Number of chunks
    pub chunks_count: u32,

    /// Database size in bytes
    pub db_size_bytes: u64,

    /// Most recent learn timestamp
    pub last_learn_at: Option<DateTime<Utc>>,
}

/// Internal chunk candidate before embedding.
#[derive(Debug, Clone)]
pub struct ChunkCandidate {
    pub source_id: String,
    pub position: u32,
    pub text: String,
    pub metadata: serde_json::Value,
}
