//! Stats command handler.

use clap::Args;
use concierge_core::{config::AppConfig, AppResult};
use concierge_retrieval::{PassageIndex, SqlitePassageIndex};

/// Show per-namespace passage counts
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let index = SqlitePassageIndex::open(&config.index_path)?;
        let counts = index.stats().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&counts)?);
            return Ok(());
        }

        if counts.is_empty() {
            println!("Index is empty");
            return Ok(());
        }

        println!("{:<20} {:>10}", "NAMESPACE", "PASSAGES");
        for count in counts {
            println!("{:<20} {:>10}", count.namespace, count.passages);
        }
        Ok(())
    }
}
