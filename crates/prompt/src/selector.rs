//! Few-shot example selection.
//!
//! Picks the single most fitting example for a query using the same MMR
//! machinery as passage retrieval, with k = 1. Example embeddings are
//! computed once when the selector is built and reused for every query in
//! the session.

use crate::types::{Example, ExampleStore};
use concierge_core::{AppError, AppResult};
use concierge_retrieval::{mmr_select, EmbeddingProvider};
use std::sync::Arc;

/// Selects one few-shot example per query.
pub struct ExampleSelector {
    examples: Vec<Example>,
    embeddings: Vec<Vec<f32>>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl ExampleSelector {
    /// Build a selector, embedding every example up front.
    pub async fn build(
        store: &ExampleStore,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        let examples = store.examples().to_vec();
        let texts: Vec<String> = examples.iter().map(|e| e.input.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        tracing::debug!("Example selector built over {} examples", examples.len());

        Ok(Self {
            examples,
            embeddings,
            embedder,
        })
    }

    /// Select the best example for the raw user query.
    pub async fn select(&self, query: &str) -> AppResult<&Example> {
        let query_embedding = self.embedder.embed(query).await?;
        let picked = mmr_select(&query_embedding, &self.embeddings, 1, 0.5);

        let index = picked.first().copied().ok_or_else(|| {
            AppError::Prompt("Example selection produced no candidate".to_string())
        })?;

        Ok(&self.examples[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_retrieval::embeddings::trigram::TrigramEmbedder;

    fn store() -> ExampleStore {
        ExampleStore::new(vec![
            Example {
                input: "suggest a red wine for steak dinner".to_string(),
                output: "Name: Cabernet Sauvignon".to_string(),
            },
            Example {
                input: "what medicine helps with headache pain".to_string(),
                output: "Name: Ibuprofen".to_string(),
            },
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_select_matches_topic() {
        let embedder = Arc::new(TrigramEmbedder::new(256));
        let selector = ExampleSelector::build(&store(), embedder).await.unwrap();

        let wine = selector
            .select("suggest a red wine for my steak")
            .await
            .unwrap();
        assert_eq!(wine.output, "Name: Cabernet Sauvignon");

        let med = selector
            .select("what medicine helps headache pain")
            .await
            .unwrap();
        assert_eq!(med.output, "Name: Ibuprofen");
    }

    #[tokio::test]
    async fn test_select_is_deterministic() {
        let embedder = Arc::new(TrigramEmbedder::new(256));
        let selector = ExampleSelector::build(&store(), embedder).await.unwrap();

        let first = selector.select("a question about wine").await.unwrap().clone();
        let second = selector.select("a question about wine").await.unwrap().clone();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_single_example_always_selected() {
        let store = ExampleStore::new(vec![Example {
            input: "only one".to_string(),
            output: "Name: Only".to_string(),
        }])
        .unwrap();
        let embedder = Arc::new(TrigramEmbedder::new(256));
        let selector = ExampleSelector::build(&store, embedder).await.unwrap();

        let picked = selector.select("anything at all").await.unwrap();
        assert_eq!(picked.output, "Name: Only");
    }
}
