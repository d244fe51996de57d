//! Prompt composition.
//!
//! Renders the layered instruction prompt: behavioral preamble, selected
//! example, retrieved context, conversation history, and the current query.
//! Example and context text is sanitized of literal braces before rendering
//! so content can never corrupt template parsing.

use crate::types::{ComposedPrompt, Example};
use concierge_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde_json::json;

const PROMPT_TEMPLATE: &str = "\
Your job is to provide the relevant response.
Given the example below, follow the format of the example and use the context to provide the answer.
<example>
Input: {{example_input}}
Output: {{example_output}}
</example>

You are provided a context, based on which you have to generate the response:
<context>
{{context}}
</context>
If someone greets with \"hi\" or \"hello\", always greet back.
If someone asks \"How are you?\" then respond with \"I am good. I am a digital concierge here to help you select the best product. Can I help you select something?\"
Your answer should be short, concise, and meaningful with relevance to the above only.
When the context is valid, structure the response after the example. The example serves as the format for the response.

You are provided with information about the chat with the Human, if relevant.
Relevant chat information:
{{chat_history}}
User: {{input}}";

/// Composes the generation prompt from the pipeline's parts.
pub struct PromptComposer {
    handlebars: Handlebars<'static>,
}

impl PromptComposer {
    pub fn new() -> AppResult<Self> {
        let mut handlebars = Handlebars::new();

        // Disable HTML escaping for plain text
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars
            .register_template_string("query", PROMPT_TEMPLATE)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        Ok(Self { handlebars })
    }

    /// Render the prompt for one query.
    ///
    /// `history` is the caller's pre-formatted conversation transcript.
    pub fn compose(
        &self,
        example: &Example,
        context: &str,
        history: &str,
        query: &str,
    ) -> AppResult<ComposedPrompt> {
        let data = json!({
            "example_input": sanitize_braces(&example.input),
            "example_output": sanitize_braces(&example.output),
            "context": sanitize_braces(context),
            "chat_history": history,
            "input": query,
        });

        let user = self
            .handlebars
            .render("query", &data)
            .map_err(|e| AppError::Prompt(format!("Failed to render prompt: {}", e)))?;

        Ok(ComposedPrompt { system: None, user })
    }
}

/// Strip literal braces from interpolated content.
///
/// Stored passages and examples may contain `{`/`}`; left in place they can
/// be mistaken for template syntax by downstream template machinery.
pub fn sanitize_braces(text: &str) -> String {
    text.replace(['{', '}'], "")
}
