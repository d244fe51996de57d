//! Namespace-scoped passage retrieval.
//!
//! Embeds the query, over-fetches candidates from one namespace partition,
//! then re-ranks with MMR so the final context passages are relevant without
//! being redundant.

use crate::embeddings::EmbeddingProvider;
use crate::index::PassageIndex;
use crate::mmr::mmr_select;
use crate::types::RetrievedPassage;
use concierge_core::AppResult;
use std::sync::Arc;

/// Tuning knobs for a retrieval pass.
#[derive(Debug, Clone)]
pub struct RetrievalOptions {
    /// Final number of passages after diversity re-ranking
    pub top_k: usize,

    /// Candidate pool size fetched from the index before re-ranking
    pub fetch_k: usize,

    /// Relevance/diversity trade-off for MMR
    pub mmr_lambda: f32,

    /// Minimum cosine similarity for a passage to be kept
    pub score_threshold: Option<f32>,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            top_k: 8,
            fetch_k: 24,
            mmr_lambda: 0.5,
            score_threshold: None,
        }
    }
}

/// Retrieves context passages for a classified query.
pub struct PassageRetriever {
    index: Arc<dyn PassageIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    options: RetrievalOptions,
}

impl PassageRetriever {
    pub fn new(
        index: Arc<dyn PassageIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        options: RetrievalOptions,
    ) -> Self {
        Self {
            index,
            embedder,
            options,
        }
    }

    /// Retrieve passages for `query` within `namespace`.
    ///
    /// No namespace means the query fell outside every known domain; the
    /// index is not contacted and the result is empty.
    pub async fn retrieve(
        &self,
        query: &str,
        namespace: Option<&str>,
    ) -> AppResult<Vec<RetrievedPassage>> {
        let Some(namespace) = namespace else {
            tracing::debug!("No namespace resolved, skipping retrieval");
            return Ok(Vec::new());
        };

        let query_embedding = self.embedder.embed(query).await?;
        let candidates = self
            .index
            .query(namespace, &query_embedding, self.options.fetch_k)
            .await?;

        if candidates.is_empty() {
            tracing::debug!("Namespace '{}' has no candidates", namespace);
            return Ok(Vec::new());
        }

        let vectors: Vec<Vec<f32>> = candidates.iter().map(|c| c.embedding.clone()).collect();
        let picked = mmr_select(
            &query_embedding,
            &vectors,
            self.options.top_k,
            self.options.mmr_lambda,
        );

        let passages: Vec<RetrievedPassage> = picked
            .into_iter()
            .map(|i| RetrievedPassage {
                text: candidates[i].text.clone(),
                relevance_score: candidates[i].score,
            })
            .filter(|p| match self.options.score_threshold {
                Some(threshold) => p.relevance_score >= threshold,
                None => true,
            })
            .collect();

        tracing::debug!(
            "Retrieved {} passages from namespace '{}'",
            passages.len(),
            namespace
        );
        Ok(passages)
    }
}

/// Join retrieved passages into a single context block.
pub fn join_context(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
