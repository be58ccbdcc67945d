//! Route handlers.
//!
//! Handlers never surface a core failure to the end user: errors are logged
//! and replaced with a static degraded-service message.

use crate::types::{AskRequest, AskResponse, ErrorResponse, HealthResponse, MatchView};
use crate::AppState;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Form, Json, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use faqbot_core::{AnswerMode, AppError, AppResult};
use faqbot_knowledge::{Category, Retriever};
use std::collections::HashMap;
use std::sync::Arc;

/// Form field carrying the inbound message text.
pub const MESSAGE_FIELD: &str = "Body";

/// Reply to an empty message.
pub const GREETING: &str =
    "Xin chào! Mình là trợ lý hỏi đáp về thẻ tín dụng Vietcombank. Bạn cần hỗ trợ gì?";

/// Reply when the core fails.
pub const DEGRADED_REPLY: &str = "Xin lỗi, hệ thống đang gặp sự cố. Bạn vui lòng thử lại sau hoặc gọi hotline 1900 54 54 13 để được hỗ trợ.";

/// `POST /chat`: messaging webhook answering with TwiML.
pub async fn chat(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let message = match form {
        Ok(Form(fields)) => fields
            .get(MESSAGE_FIELD)
            .map(|m| m.trim().to_string())
            .unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Unreadable webhook form: {}", e);
            String::new()
        }
    };

    if message.is_empty() {
        tracing::debug!("Empty webhook message, sending greeting");
        return twiml(GREETING);
    }

    tracing::info!(mode = state.answer_mode.as_str(), "Webhook message: {}", message);

    let retriever = Arc::clone(&state.retriever);
    let mode = state.answer_mode;
    let reply = run_core(move || retriever.reply(&message, mode)).await;

    match reply {
        Ok(reply) => twiml(&reply),
        Err(e) => {
            tracing::error!("Webhook reply failed: {}", e);
            twiml(DEGRADED_REPLY)
        }
    }
}

/// `POST /api/ask`: JSON endpoint for testing the retriever.
pub async fn ask(
    State(state): State<AppState>,
    request: Result<Json<AskRequest>, JsonRejection>,
) -> Response {
    let request = match request {
        Ok(Json(request)) => request,
        Err(e) => {
            tracing::warn!("Unreadable ask request: {}", e);
            return error_response(StatusCode::BAD_REQUEST, e.body_text());
        }
    };

    let message = request.message.trim().to_string();

    if message.is_empty() {
        return Json(AskResponse {
            answer: GREETING.to_string(),
            category: Category::General,
            matches: Vec::new(),
        })
        .into_response();
    }

    let retriever = Arc::clone(&state.retriever);
    let result = run_core(move || explain(&retriever, &message, &request)).await;

    match result {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            let status = match e {
                AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::error!("Ask request failed: {}", e);
            error_response(status, e.to_string())
        }
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            error,
            answer: DEGRADED_REPLY.to_string(),
        }),
    )
        .into_response()
}

/// `GET /health`: liveness probe that does not score anything.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        entries: state.retriever.len(),
        vocabulary: state.retriever.feature_space().len(),
        started_at: state.started_at,
    })
}

fn explain(retriever: &Retriever, message: &str, request: &AskRequest) -> AppResult<AskResponse> {
    let matches = retriever
        .top_k(message, request.top_k)?
        .into_iter()
        .map(|m| {
            let entry = retriever.entry(m.entry_index)?;
            Ok(MatchView {
                index: m.entry_index,
                question: entry.question.clone(),
                source: entry.source.clone(),
                score: m.score,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let mode = if request.contextual {
        AnswerMode::Contextual
    } else if request.naturalize {
        AnswerMode::Natural
    } else {
        AnswerMode::Raw
    };

    Ok(AskResponse {
        answer: retriever.reply(message, mode)?,
        category: retriever.categorize(message),
        matches,
    })
}

/// Run CPU-bound core work off the async workers; a panic becomes an error.
async fn run_core<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Server(format!("Reply task failed: {}", e)))?
}

fn twiml(message: &str) -> Response {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response>\n    <Message>{}</Message>\n</Response>",
        quick_xml::escape::escape(message)
    );

    ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
}
