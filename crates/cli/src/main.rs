//! FAQ Bot CLI
//!
//! Main entry point for the faqbot command-line tool.
//! Serves the messaging webhook and queries the FAQ retriever locally.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, SearchCommand, ServeCommand, StatsCommand};
use faqbot_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// FAQ Bot - answers customer questions from a FAQ corpus
#[derive(Parser, Debug)]
#[command(name = "faqbot")]
#[command(about = "FAQ retrieval bot with a messaging webhook", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory of FAQ JSON documents
    #[arg(short, long, global = true, env = "FAQBOT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Response catalog YAML (greetings, templates, fallbacks)
    #[arg(long, global = true, env = "FAQBOT_CATALOG")]
    catalog: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server (webhook, JSON API, health)
    Serve(ServeCommand),

    /// Answer a single question
    Ask(AskCommand),

    /// Show the best-matching FAQ entries for a query
    Search(SearchCommand),

    /// Show corpus and index statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from file and environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.data_dir,
        cli.catalog,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::info!("FAQ bot starting");
    tracing::debug!("Data dir: {:?}", config.data_dir);
    tracing::debug!("Catalog: {:?}", config.catalog_file);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
        Commands::Search(_) => "search",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(config).await,
        Commands::Ask(cmd) => cmd.execute(&config),
        Commands::Search(cmd) => cmd.execute(&config),
        Commands::Stats(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
