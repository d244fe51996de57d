//! Retrieval type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A passage returned to the prompt composer.
///
/// Transient: produced per request and discarded after composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Passage text
    pub text: String,

    /// Cosine similarity to the (augmented) query
    pub relevance_score: f32,
}

/// An index candidate with its stored vector, used for diversity re-ranking.
#[derive(Debug, Clone)]
pub struct ScoredPassage {
    /// Passage identifier
    pub id: String,

    /// Passage text
    pub text: String,

    /// Cosine similarity to the query embedding
    pub score: f32,

    /// Stored embedding (normalized)
    pub embedding: Vec<f32>,
}

/// A persisted passage row in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageRecord {
    /// Unique passage identifier
    pub id: String,

    /// Index partition key
    pub namespace: String,

    /// Passage text
    pub text: String,

    /// Embedding vector
    pub embedding: Vec<f32>,

    /// When this passage was indexed
    pub indexed_at: DateTime<Utc>,
}

/// Per-namespace passage count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceCount {
    /// Namespace key
    pub namespace: String,

    /// Number of passages stored
    pub passages: u32,
}
