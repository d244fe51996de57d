//! Concierge CLI
//!
//! Command-line front end for the conversational retrieval pipeline:
//! ask questions, seed the passage index, inspect namespace stats.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, SeedCommand, StatsCommand};
use concierge_core::{config::AppConfig, logging, ErrorResponse};
use std::path::PathBuf;
use std::process::ExitCode;

/// Concierge - a conversational retrieval-augmented assistant
#[derive(Parser, Debug)]
#[command(name = "concierge")]
#[command(about = "Conversational retrieval-augmented assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "CONCIERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Completion provider (ollama, openai)
    #[arg(short, long, global = true, env = "CONCIERGE_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "CONCIERGE_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question through the pipeline
    Ask(AskCommand),

    /// Embed and index passages into a namespace
    Seed(SeedCommand),

    /// Show per-namespace passage counts
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    let config = config.with_overrides(
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    if let Err(e) = logging::init_logging(config.log_level.as_deref(), config.no_color) {
        return fail(&e);
    }

    if let Err(e) = config.validate() {
        return fail(&e);
    }

    tracing::debug!("Provider: {}, model: {}", config.provider, config.model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Seed(_) => "seed",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Seed(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            fail(&e)
        }
    }
}

/// Print the failure as a single well-formed JSON error object.
fn fail(error: &concierge_core::AppError) -> ExitCode {
    let response = ErrorResponse::from(error);
    match serde_json::to_string(&response) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{{\"kind\":\"other\",\"message\":\"{}\"}}", error),
    }
    ExitCode::FAILURE
}
