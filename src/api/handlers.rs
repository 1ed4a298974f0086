use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use std::time::Instant;

use crate::rag_chain::Answerer;
use crate::shell::{EMPTY_QUERY_WARNING, Shell, ShellState};

use super::models::{AnswerRequest, AnswerResponse, HealthResponse};

pub async fn answer_handler(
    State(answerer): State<Arc<dyn Answerer>>,
    Json(request): Json<AnswerRequest>,
) -> (StatusCode, Json<AnswerResponse>) {
    let start = Instant::now();

    let mut shell = Shell::new();
    shell.submit(answerer.as_ref(), &request.query).await;
    let processing_time_ms = start.elapsed().as_millis() as u64;

    match shell.into_state() {
        ShellState::Idle { warning } => (
            StatusCode::BAD_REQUEST,
            Json(AnswerResponse::Idle {
                warning: warning.unwrap_or_else(|| EMPTY_QUERY_WARNING.to_string()),
            }),
        ),
        ShellState::Resolved(answer) => {
            log::info!("answered query in {processing_time_ms}ms");
            (
                StatusCode::OK,
                Json(AnswerResponse::Resolved {
                    answer,
                    processing_time_ms,
                }),
            )
        }
        ShellState::Failed(error) => (
            StatusCode::BAD_GATEWAY,
            Json(AnswerResponse::Failed {
                error,
                processing_time_ms,
            }),
        ),
    }
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
