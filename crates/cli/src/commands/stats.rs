//! Stats command handler.
//!
//! Loads the corpus and reports what the index was built from.

use clap::Args;
use faqbot_core::{config::AppConfig, AppResult};

/// Show corpus and index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let retriever = faqbot_knowledge::open(config)?;
        let stats = faqbot_knowledge::stats(&retriever);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        println!("Data dir:    {}", config.data_dir.display());
        println!("Entries:     {}", stats.entries);
        println!("Vocabulary:  {} (cap {})", stats.vocabulary, config.max_features);
        println!();
        println!("Sources:");
        for (source, count) in &stats.sources {
            println!("  {:<40} {}", source, count);
        }

        Ok(())
    }
}
