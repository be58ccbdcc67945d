//! Serve command handler.
//!
//! Builds the retriever once and runs the HTTP server until Ctrl-C.

use clap::Args;
use faqbot_core::{config::AppConfig, AnswerMode, AppResult};
use faqbot_server::AppState;
use std::sync::Arc;

/// Run the HTTP server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides FAQBOT_BIND)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Webhook reply style (raw, natural, contextual)
    #[arg(short, long, env = "FAQBOT_ANSWER_MODE")]
    pub mode: Option<AnswerMode>,
}

impl ServeCommand {
    pub async fn execute(&self, mut config: AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");
        tracing::debug!("Serve options: {:?}", self);

        if let Some(ref bind) = self.bind {
            config.bind = bind.clone();
        }
        if let Some(mode) = self.mode {
            config.answer_mode = mode;
        }
        let addr = config.socket_addr()?;

        let retriever = faqbot_knowledge::open(&config)?;
        let state = AppState::new(Arc::new(retriever), config.answer_mode);

        faqbot_server::serve(state, addr).await
    }
}
