//! Raw generation and evaluation endpoints: prompt in, model reply out

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use super::response::{ai_error_response, bad_request, error_response};
use super::AppState;
use crate::ai::CallKind;
use crate::evaluation::mock_evaluation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub game_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockEvaluationRequest {
    #[serde(default)]
    pub game_id: Option<String>,
}

pub fn ai_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/evaluate", post(evaluate))
        .route("/api/evaluate-mock", post(evaluate_mock))
        .with_state(state)
}

async fn complete(state: &AppState, kind: CallKind, body: Result<Json<PromptRequest>, JsonRejection>) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_request(rejection),
    };

    let Some(prompt) = req.prompt.as_deref().filter(|p| !p.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Bad request", "prompt is required");
    };

    log::info!("[{}] prompt length: {} chars", kind.label(), prompt.chars().count());
    match state.ai.complete(kind, prompt, req.game_id.as_deref()).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            log::error!("[{}] {}", kind.label(), e);
            ai_error_response(&e)
        }
    }
}

/// POST /api/generate
async fn generate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Response {
    complete(&state, CallKind::Generation, body).await
}

/// POST /api/evaluate
async fn evaluate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Response {
    complete(&state, CallKind::Evaluation, body).await
}

/// POST /api/evaluate-mock
async fn evaluate_mock(body: Result<Json<MockEvaluationRequest>, JsonRejection>) -> Response {
    match body {
        Ok(Json(req)) => {
            log::info!("[evaluate-mock] gameId: {}", req.game_id.as_deref().unwrap_or("-"));
            Json(mock_evaluation(req.game_id.as_deref())).into_response()
        }
        Err(rejection) => bad_request(rejection),
    }
}
