//! Request and response bodies of the HTTP API.

use chrono::{DateTime, Utc};
use faqbot_knowledge::Category;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/ask`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[serde(default)]
    pub message: String,

    /// Rewrite the answer conversationally
    #[serde(default = "default_naturalize")]
    pub naturalize: bool,

    /// Append the runner-up match (implies a natural reply)
    #[serde(default)]
    pub contextual: bool,

    /// Number of ranked matches to report
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_naturalize() -> bool {
    true
}

fn default_top_k() -> usize {
    3
}

/// One ranked match reported by `POST /api/ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchView {
    pub index: usize,
    pub question: String,
    pub source: String,
    pub score: f32,
}

/// Response of `POST /api/ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub category: Category,
    pub matches: Vec<MatchView>,
}

/// Error body; `answer` is still a user-facing reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub answer: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub entries: usize,
    pub vocabulary: usize,
    pub started_at: DateTime<Utc>,
}
