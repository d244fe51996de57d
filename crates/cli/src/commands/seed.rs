//! Seed command handler.
//!
//! Embeds passages from a JSONL file and upserts them into one namespace of
//! the SQLite index. Stands in for the external ingestion job so the
//! pipeline is runnable end to end.

use clap::Args;
use concierge_core::{config::AppConfig, AppError, AppResult};
use concierge_retrieval::{
    create_provider, new_record, EmbeddingProvider, PassageIndex, SqlitePassageIndex,
};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct SeedLine {
    text: String,
}

/// Embed and index passages into a namespace
#[derive(Args, Debug)]
pub struct SeedCommand {
    /// Namespace to index into
    #[arg(short, long)]
    pub namespace: String,

    /// JSONL file, one {"text": ...} object per line
    #[arg(short, long)]
    pub file: PathBuf,
}

impl SeedCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(
            "Seeding namespace '{}' from {:?}",
            self.namespace,
            self.file
        );

        let contents = std::fs::read_to_string(&self.file).map_err(|e| {
            AppError::Config(format!("Failed to read seed file {:?}: {}", self.file, e))
        })?;

        let mut texts = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let parsed: SeedLine = serde_json::from_str(line).map_err(|e| {
                AppError::Config(format!("Invalid JSON on line {}: {}", line_no + 1, e))
            })?;
            texts.push(parsed.text);
        }

        if texts.is_empty() {
            return Err(AppError::Config("Seed file contains no passages".to_string()));
        }

        let embedding_endpoint = config.provider_endpoint(&config.embedding_provider);
        let embedder = create_provider(
            &config.embedding_provider,
            &config.embedding_model,
            config.embedding_dim,
            embedding_endpoint.as_deref(),
        )?;

        let index = SqlitePassageIndex::open(&config.index_path)?;

        let embeddings = embedder.embed_batch(&texts).await?;
        for (text, embedding) in texts.iter().zip(embeddings) {
            index
                .upsert(&new_record(&self.namespace, text, embedding))
                .await?;
        }

        println!(
            "Indexed {} passages into namespace '{}'",
            texts.len(),
            self.namespace
        );
        Ok(())
    }
}
