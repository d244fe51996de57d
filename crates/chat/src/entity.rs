//! Anaphor detection and entity extraction.
//!
//! Queries like "what about that one?" only make sense against the system's
//! previous response. When an anaphor word is present and a prior response
//! exists, the model is asked to pull the referenced entity out of that
//! response; the entity is then appended to the retrieval query.

use concierge_core::AppResult;
use concierge_llm::{LlmClient, LlmRequest};
use regex::Regex;
use std::sync::{Arc, OnceLock};

fn anaphor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(?:this|that|them|above)\b").expect("anaphor pattern is valid")
    })
}

/// Whole-word, case-insensitive anaphor test.
pub fn contains_anaphor(query: &str) -> bool {
    anaphor_pattern().is_match(query)
}

/// Resolves anaphoric references against the prior response.
pub struct EntityExtractor {
    client: Arc<dyn LlmClient>,
    model: String,
}

impl EntityExtractor {
    pub fn new(client: Arc<dyn LlmClient>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    /// Extract the referenced entity, or `""`.
    ///
    /// The common fast path makes no model call: no anaphor in the query, or
    /// an anaphor with nothing to resolve against.
    pub async fn extract(&self, query: &str, prior_response: &str) -> AppResult<String> {
        if !contains_anaphor(query) {
            return Ok(String::new());
        }
        if prior_response.trim().is_empty() {
            tracing::debug!("Anaphor present but no prior response to resolve against");
            return Ok(String::new());
        }

        let prompt = format!(
            "Extract the name of the product or entity being discussed in the text below.\n\
             Respond with only the name, nothing else. If no entity is present, respond with nothing.\n\n\
             <text>\n{}\n</text>\n\n\
             Entity:",
            prior_response
        );
        let request = LlmRequest::new(prompt, &self.model).with_temperature(0.0);

        let response = self.client.complete(&request).await?;
        let entity = response.content.trim().to_string();

        tracing::debug!("Extracted entity '{}' for anaphoric query", entity);
        Ok(entity)
    }
}

/// Append the extracted entity to the query for retrieval.
pub fn augment_query(query: &str, entity: &str) -> String {
    if entity.is_empty() {
        query.to_string()
    } else {
        format!("{} {}", query, entity)
    }
}
