//! Search command handler.
//!
//! Shows the ranked FAQ matches for a query, useful for tuning thresholds.

use clap::Args;
use faqbot_core::{config::AppConfig, AppError, AppResult};
use faqbot_knowledge::{ANSWER_THRESHOLD, CONTEXTUAL_THRESHOLD};

/// Show the best-matching FAQ entries for a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Search query
    pub query: Vec<String>,

    /// Number of results to show
    #[arg(short = 'k', long, default_value = "5")]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");
        tracing::debug!("Search options: {:?}", self);

        let query = self.query.join(" ");
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidArgument("No query provided".to_string()));
        }

        let retriever = faqbot_knowledge::open(config)?;
        let matches = retriever.top_k(query, self.top_k)?;

        if self.json {
            let mut results = Vec::with_capacity(matches.len());
            for m in &matches {
                let entry = retriever.entry(m.entry_index)?;
                results.push(serde_json::json!({
                    "index": m.entry_index,
                    "score": m.score,
                    "question": entry.question,
                    "source": entry.source,
                }));
            }
            let output = serde_json::json!({
                "query": query,
                "category": retriever.categorize(query),
                "matches": results,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Category: {}", retriever.categorize(query));
        println!();
        for (rank, m) in matches.iter().enumerate() {
            let entry = retriever.entry(m.entry_index)?;
            let marker = if m.score >= ANSWER_THRESHOLD {
                "*"
            } else if m.score >= CONTEXTUAL_THRESHOLD {
                "+"
            } else {
                " "
            };
            println!(
                "{:>2}. [{:.3}]{} {} ({})",
                rank + 1,
                m.score,
                marker,
                entry.question,
                entry.source
            );
        }
        println!();
        println!(
            "* answers (>= {:.2})   + contextual runner-up (> {:.2})",
            ANSWER_THRESHOLD, CONTEXTUAL_THRESHOLD
        );

        Ok(())
    }
}
