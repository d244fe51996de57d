//! Conversational query pipeline: classification, anaphor resolution,
//! retrieval, few-shot prompting, and generation.

pub mod classifier;
pub mod entity;
pub mod generator;
pub mod session;
pub mod types;

pub use classifier::WorkflowClassifier;
pub use entity::{augment_query, contains_anaphor, EntityExtractor};
pub use generator::{extract_answer, ResponseGenerator};
pub use session::{ChatSession, WORKFLOW_UNRESOLVED};
pub use types::{format_history, ConversationTurn, QueryRequest, QueryResponse, Role};
