//! Deterministic trigram embedding provider.
//!
//! Generates content-dependent vectors from character trigrams and word
//! frequencies. Not semantically accurate like a neural model, but
//! deterministic and consistent, which is what tests and local development
//! need.

use crate::embeddings::EmbeddingProvider;
use concierge_core::AppResult;
use std::collections::{HashMap, HashSet};

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Trigram-based deterministic embedder.
#[derive(Debug)]
pub struct TrigramEmbedder {
    dimensions: usize,
}

impl TrigramEmbedder {
    /// Create a new embedder with the given output dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];

        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split_whitespace()
            .filter(|w| !stop_words.contains(w) && w.len() > 2)
            .collect();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in &words {
            *word_freq.entry(*word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            // Character trigrams spread each word over several dimensions
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let dim_idx = (hash_bytes(trigram.as_bytes(), 37) as usize) % self.dimensions;
                embedding[dim_idx] += (*freq as f32).sqrt();
            }

            // Whole-word signal
            let base_dim = (hash_bytes(word.as_bytes(), 31) as usize) % self.dimensions;
            embedding[base_dim] += *freq as f32;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

fn hash_bytes(bytes: &[u8], multiplier: u64) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| {
        acc.wrapping_mul(multiplier).wrapping_add(b as u64)
    })
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramEmbedder {
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

    #[tokio::test]
    async fn test_trigram_dimensions() {
        let embedder = TrigramEmbedder::new(384);
        assert_eq!(embedder.dimensions(), 384);
        assert_eq!(embedder.provider_name(), "trigram");
        assert_eq!(embedder.model_name(), "trigram-v1");
    }

    #[tokio::test]
    async fn test_trigram_unit_norm() {
        let embedder = TrigramEmbedder::new(384);
        let embedding = embedder.embed("a crisp white wine").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_trigram_deterministic() {
        let embedder = TrigramEmbedder::new(384);
        let first = embedder.embed("deterministic test").await.unwrap();
        let second = embedder.embed("deterministic test").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_trigram_different_texts_differ() {
        let embedder = TrigramEmbedder::new(384);
        let first = embedder.embed("merlot pairs with beef").await.unwrap();
        let second = embedder.embed("ibuprofen dosage guidance").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_trigram_empty_text_is_zero_vector() {
        let embedder = TrigramEmbedder::new(384);
        let embedding = embedder.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_trigram_batch() {
        let embedder = TrigramEmbedder::new(128);
        let texts = vec!["first".to_string(), "second".to_string()];
        let embeddings = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 2);
        assert!(embeddings.iter().all(|e| e.len() == 128));
    }
}
