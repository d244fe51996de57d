//! Chat session orchestration.
//!
//! A session is built once per user from injected collaborators and reused
//! across requests. All per-request state (history, prior response) comes in
//! with the request, so concurrent sessions are fully independent.

use crate::classifier::WorkflowClassifier;
use crate::entity::{augment_query, EntityExtractor};
use crate::generator::ResponseGenerator;
use crate::types::{format_history, QueryRequest, QueryResponse};
use concierge_core::{AppResult, NamespaceRegistry};
use concierge_llm::LlmClient;
use concierge_prompt::{ExampleSelector, ExampleStore, PromptComposer};
use concierge_retrieval::{
    join_context, EmbeddingProvider, PassageIndex, PassageRetriever, RetrievalOptions,
};
use std::sync::Arc;

/// Sentinel workflow value asking the pipeline to classify the query itself.
pub const WORKFLOW_UNRESOLVED: &str = "Other";

/// A reusable query-processing session.
pub struct ChatSession {
    classifier: WorkflowClassifier,
    extractor: EntityExtractor,
    retriever: PassageRetriever,
    selector: ExampleSelector,
    composer: PromptComposer,
    generator: ResponseGenerator,
    registry: NamespaceRegistry,
}

impl ChatSession {
    /// Build a session over injected collaborators.
    ///
    /// Example embeddings are computed here, once; an empty example store
    /// fails construction rather than the first query.
    pub async fn new(
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn PassageIndex>,
        examples: &ExampleStore,
        registry: NamespaceRegistry,
        options: RetrievalOptions,
        model: &str,
    ) -> AppResult<Self> {
        let selector = ExampleSelector::build(examples, embedder.clone()).await?;

        Ok(Self {
            classifier: WorkflowClassifier::new(llm.clone(), registry.clone(), model),
            extractor: EntityExtractor::new(llm.clone(), model),
            retriever: PassageRetriever::new(index, embedder, options),
            selector,
            composer: PromptComposer::new()?,
            generator: ResponseGenerator::new(llm, model),
            registry,
        })
    }

    /// Run one query through the full pipeline.
    pub async fn process_query(&self, request: &QueryRequest) -> AppResult<QueryResponse> {
        // Namespace: caller-resolved workflow wins; the sentinel triggers
        // classification.
        let namespace = if request.workflow == WORKFLOW_UNRESOLVED {
            self.classifier.classify(&request.query).await?
        } else {
            Some(request.workflow.clone())
        };
        let classified = self.registry.label_for(namespace.as_deref());

        tracing::info!(
            "Processing query in namespace {:?} (classified '{}')",
            namespace,
            classified
        );

        let entity = self
            .extractor
            .extract(&request.query, &request.recent_response)
            .await?;
        let augmented = augment_query(&request.query, &entity);

        let passages = self
            .retriever
            .retrieve(&augmented, namespace.as_deref())
            .await?;
        let context = join_context(&passages);

        // Example selection goes by the raw query, retrieval by the
        // augmented one.
        let example = self.selector.select(&request.query).await?;

        let history = format_history(&request.history);
        let prompt = self
            .composer
            .compose(example, &context, &history, &request.query)?;

        let response = self.generator.generate(&prompt).await?;

        Ok(QueryResponse {
            response,
            classified,
        })
    }
}
