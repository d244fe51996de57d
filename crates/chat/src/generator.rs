//! Response generation and answer extraction.

use concierge_core::AppResult;
use concierge_llm::{LlmClient, LlmRequest};
use concierge_prompt::ComposedPrompt;
use std::sync::Arc;

/// Runs the composed prompt through the completion model.
pub struct ResponseGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
}

impl ResponseGenerator {
    pub fn new(client: Arc<dyn LlmClient>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    /// Generate the answer text for a composed prompt.
    ///
    /// Decoding is pinned to temperature 0.0 for reproducibility.
    pub async fn generate(&self, prompt: &ComposedPrompt) -> AppResult<String> {
        let mut request = LlmRequest::new(&prompt.user, &self.model).with_temperature(0.0);
        if let Some(system) = &prompt.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        Ok(extract_answer(&response.content))
    }
}

/// Strip a leading speaker label from the model output.
///
/// Models often prefix answers with "System:" or "Response:". The answer is
/// whatever follows the last colon, trimmed; output with no colon is
/// returned unchanged.
pub fn extract_answer(raw: &str) -> String {
    match raw.rsplit_once(':') {
        Some((_, answer)) => answer.trim().to_string(),
        None => raw.to_string(),
    }
}
