//! Zero-shot workflow classification.
//!
//! Maps an ambiguous query to a namespace key with a single-label
//! instruction prompt. The mapping from model output to namespace is total:
//! malformed output degrades to no namespace, never an error.

use concierge_core::{AppResult, NamespaceRegistry};
use concierge_llm::{LlmClient, LlmRequest};
use std::sync::Arc;

/// Classifies queries into namespace keys.
pub struct WorkflowClassifier {
    client: Arc<dyn LlmClient>,
    registry: NamespaceRegistry,
    model: String,
}

impl WorkflowClassifier {
    pub fn new(client: Arc<dyn LlmClient>, registry: NamespaceRegistry, model: &str) -> Self {
        Self {
            client,
            registry,
            model: model.to_string(),
        }
    }

    /// Classify a query, returning the matched namespace key.
    ///
    /// Only transport failure propagates; output that matches no keyword
    /// resolves to `None` and the pipeline proceeds ungrounded.
    pub async fn classify(&self, query: &str) -> AppResult<Option<String>> {
        let prompt = self.build_prompt(query);
        let request = LlmRequest::new(prompt, &self.model).with_temperature(0.0);

        let response = self.client.complete(&request).await?;
        let resolved = self
            .registry
            .match_classification(&response.content)
            .map(|key| key.to_string());

        tracing::debug!(
            "Classifier output '{}' resolved to {:?}",
            response.content.trim(),
            resolved
        );
        Ok(resolved)
    }

    fn build_prompt(&self, query: &str) -> String {
        let labels = self
            .registry
            .classifier_labels()
            .iter()
            .map(|label| format!("`{}`", label))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Given the user question below, classify it as either being about {}, or `Other`.\n\n\
             Do not respond with more than one word.\n\n\
             <question>\n{}\n</question>\n\n\
             Classification:",
            labels, query
        )
    }
}
