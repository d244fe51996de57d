//! Chat request/response types.

use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Human,
    System,
}

/// One turn of the caller-owned conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }
}

/// Caller input for one pipeline invocation.
///
/// `workflow` is either an explicit namespace key or the `"Other"` sentinel,
/// which asks the pipeline to classify the query itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Raw user utterance for this turn
    pub query: String,

    /// Namespace key, or "Other" to request classification
    pub workflow: String,

    /// Prior turns, oldest first
    #[serde(default)]
    pub history: Vec<ConversationTurn>,

    /// The system's most recent response, used for anaphor resolution
    #[serde(default)]
    pub recent_response: String,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, workflow: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            workflow: workflow.into(),
            history: Vec::new(),
            recent_response: String::new(),
        }
    }
}

/// Pipeline output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The extracted answer text
    pub response: String,

    /// Display label of the resolved namespace ("Other" when unresolved)
    pub classified: String,
}

/// Render conversation turns into the transcript block the prompt carries.
pub fn format_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| match turn.role {
            Role::Human => format!("Human: {}", turn.text),
            Role::System => format!("System: {}", turn.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
