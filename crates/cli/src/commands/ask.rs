//! Ask command handler.
//!
//! Answers one question the way the webhook would.

use clap::Args;
use faqbot_core::{config::AppConfig, AnswerMode, AppError, AppResult};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Vec<String>,

    /// Print the stored answer without rewriting it
    #[arg(long, conflicts_with = "contextual")]
    pub raw: bool,

    /// Append the runner-up answer when it is relevant too
    #[arg(long)]
    pub contextual: bool,

    /// Seed for template selection (reproducible replies)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.question.join(" ");
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidArgument(
                "No question provided".to_string(),
            ));
        }

        let mode = self.mode();
        let retriever = faqbot_knowledge::open(config)?;

        let answer = match self.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                retriever.reply_with_rng(question, mode, &mut rng)?
            }
            None => retriever.reply(question, mode)?,
        };

        if self.json {
            let output = serde_json::json!({
                "question": question,
                "mode": mode.as_str(),
                "category": retriever.categorize(question),
                "answer": answer,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer);
        }

        Ok(())
    }

    fn mode(&self) -> AnswerMode {
        if self.raw {
            AnswerMode::Raw
        } else if self.contextual {
            AnswerMode::Contextual
        } else {
            AnswerMode::Natural
        }
    }
}
