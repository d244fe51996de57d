//! Ask command handler.
//!
//! Runs one query through the full pipeline and prints the answer.

use clap::Args;
use concierge_chat::{ChatSession, ConversationTurn, QueryRequest, WORKFLOW_UNRESOLVED};
use concierge_core::{config::AppConfig, AppError, AppResult};
use concierge_llm::create_client;
use concierge_prompt::{Example, ExampleStore};
use concierge_retrieval::{create_provider, RetrievalOptions, SqlitePassageIndex};
use std::path::PathBuf;
use std::sync::Arc;

/// Ask a question through the pipeline
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Namespace key, or "Other" to let the classifier decide
    #[arg(short, long, default_value = WORKFLOW_UNRESOLVED)]
    pub workflow: String,

    /// The system's most recent response, for anaphor resolution
    #[arg(long, default_value = "")]
    pub recent_response: String,

    /// JSON file with prior conversation turns
    #[arg(long)]
    pub history_file: Option<PathBuf>,

    /// YAML file with few-shot examples
    #[arg(short, long)]
    pub examples_file: Option<PathBuf>,

    /// Output the full {response, classified} object as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let examples = match &self.examples_file {
            Some(path) => ExampleStore::load(path)?,
            None => default_examples()?,
        };

        let history = match &self.history_file {
            Some(path) => load_history(path)?,
            None => Vec::new(),
        };

        let session = build_session(config, &examples).await?;

        let request = QueryRequest {
            query: self.query.clone(),
            workflow: self.workflow.clone(),
            history,
            recent_response: self.recent_response.clone(),
        };

        let response = session.process_query(&request).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("{}", response.response);
        }

        Ok(())
    }
}

/// Wire the session from configuration.
async fn build_session(config: &AppConfig, examples: &ExampleStore) -> AppResult<ChatSession> {
    let endpoint = config.provider_endpoint(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);
    let llm = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())?;

    let embedding_endpoint = config.provider_endpoint(&config.embedding_provider);
    let embedder = create_provider(
        &config.embedding_provider,
        &config.embedding_model,
        config.embedding_dim,
        embedding_endpoint.as_deref(),
    )?;

    let index = Arc::new(SqlitePassageIndex::open(&config.index_path)?);

    let options = RetrievalOptions {
        top_k: config.retrieval.top_k,
        fetch_k: config.retrieval.fetch_k,
        mmr_lambda: config.retrieval.mmr_lambda,
        score_threshold: config.retrieval.score_threshold,
    };

    ChatSession::new(
        llm,
        embedder,
        index,
        examples,
        config.namespace_registry(),
        options,
        &config.model,
    )
    .await
}

fn load_history(path: &PathBuf) -> AppResult<Vec<ConversationTurn>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Failed to read history file {:?}: {}", path, e)))?;
    let history: Vec<ConversationTurn> = serde_json::from_str(&contents)?;
    Ok(history)
}

fn default_examples() -> AppResult<ExampleStore> {
    ExampleStore::new(vec![
        Example {
            input: "suggest a red wine that pairs with steak".to_string(),
            output: "Name: Cabernet Sauvignon, Region: Napa Valley, Notes: full-bodied"
                .to_string(),
        },
        Example {
            input: "what can I take for a mild headache".to_string(),
            output: "Name: Ibuprofen, Dosage: 200mg, Notes: take with food".to_string(),
        },
    ])
}
