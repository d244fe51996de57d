//! Passage retrieval for the concierge pipeline.
//!
//! Embeddings, a namespace-partitioned SQLite index, cosine/MMR ranking,
//! and the retriever that ties them together.

pub mod embeddings;
pub mod index;
pub mod mmr;
pub mod retriever;
pub mod types;

pub use embeddings::{create_provider, EmbeddingProvider};
pub use index::{new_record, PassageIndex, SqlitePassageIndex};
pub use mmr::{cosine_similarity, mmr_select};
pub use retriever::{join_context, PassageRetriever, RetrievalOptions};
pub use types::{NamespaceCount, PassageRecord, RetrievedPassage, ScoredPassage};
