//! Offline embedding provider built from hashed word trigrams.

use crate::embeddings::EmbeddingProvider;
use arag_core::AppResult;
use std::collections::HashMap;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "how",
];

/// Deterministic, content-dependent embeddings without a model server.
///
/// Each non-stop word contributes its character trigrams and the word
/// itself to hashed dimensions; the result is normalized to unit length.
/// Texts sharing vocabulary score high under cosine similarity, which is
/// enough for local development and tests.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let hash = window
                    .iter()
                    .fold(0u64, |acc, c| acc.wrapping_mul(37).wrapping_add(*c as u64));
                embedding[(hash as usize) % self.dimensions] += (*freq as f32).sqrt();
            }

            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(word_hash as usize) % self.dimensions] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::cosine_similarity;

    #[tokio::test]
    async fn test_embedding_is_unit_length() {
        let provider = TrigramProvider::new(384);
        let embedding = provider.embed("agent memory types").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = TrigramProvider::new(128);
        let a = provider.embed("deterministic test").await.unwrap();
        let b = provider.embed("deterministic test").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_higher() {
        let provider = TrigramProvider::new(384);
        let query = provider.embed("types of agent memory").await.unwrap();
        let related = provider
            .embed("Agent memory comes in short-term and long-term types.")
            .await
            .unwrap();
        let unrelated = provider
            .embed("Bears won the football game yesterday.")
            .await
            .unwrap();

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = TrigramProvider::new(64);
        let embedding = provider.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }
}
