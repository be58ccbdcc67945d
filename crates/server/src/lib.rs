//! HTTP front end of the FAQ bot.
//!
//! Routes:
//! - `POST /chat`: messaging webhook (form field `Body`, TwiML reply)
//! - `POST /api/ask`: JSON endpoint for trying the retriever
//! - `GET /health`: status probe

pub mod routes;
pub mod types;

use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use faqbot_core::{AnswerMode, AppError, AppResult};
use faqbot_knowledge::Retriever;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state of every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub retriever: Arc<Retriever>,
    pub answer_mode: AnswerMode,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(retriever: Arc<Retriever>, answer_mode: AnswerMode) -> Self {
        Self {
            retriever,
            answer_mode,
            started_at: Utc::now(),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(routes::chat))
        .route("/api/ask", post(routes::ask))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(
        "Listening on {} ({} FAQ entries, webhook mode: {})",
        addr,
        state.retriever.len(),
        state.answer_mode.as_str()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
